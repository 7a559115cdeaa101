//! Configuration errors raised by the fluent rule builder.

use crate::registry::RegistryError;
use thiserror::Error;

/// Malformed builder usage.
///
/// The builder records the first error it encounters and keeps accepting
/// calls; [`RuleBuilder::build`](crate::builder::RuleBuilder::build) returns
/// it and commits nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("'{member}' is not a member of {model}")]
    UnknownMember { model: &'static str, member: String },

    #[error("No member selected. Call .rule_for(member) before adding checks")]
    NoMemberSelected,

    #[error("No rule in scope. Add a check before calling .{0}()")]
    NoRuleInScope(&'static str),

    #[error("Otherwise without a preceding when. Call .when(..) immediately before .otherwise(..)")]
    OtherwiseWithoutWhen,

    #[error("Branch kinds differ. Pair .when with .otherwise and .when_async with .otherwise_async")]
    OtherwiseMismatch,

    #[error("{model}.{member} already has a before_validation transform")]
    DuplicateTransform {
        model: &'static str,
        member: &'static str,
    },

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
