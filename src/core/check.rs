//! The `Check` trait: the atomic correctness test for a member value.

use super::model::{Member, Model};
use super::value::Value;
use crate::message::FormatArg;
use std::borrow::Cow;
use std::error::Error as StdError;
use thiserror::Error;

/// Unexpected failure while executing a check.
///
/// These are programming or environment errors, not validation failures;
/// the engine propagates them to the caller instead of recording them.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Message(String),

    #[error("member '{0}' does not exist on the model")]
    UnknownMember(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

/// Everything a check may consult besides the value itself.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub instance: &'a dyn Model,
    pub member: &'a Member,
}

/// A reusable validity test.
///
/// Implementations should be pure: the same value and context must always
/// produce the same answer.
pub trait Check: Send + Sync {
    /// Short name of the check, used in failure records and for
    /// convention-based message keys (`Member_Kind`).
    fn kind(&self) -> &'static str;

    fn validate(&self, value: &Value, context: &CheckContext<'_>) -> Result<bool, CheckError>;

    /// Inline message template, formatted with the member's display name as
    /// `{0}` followed by [`message_args`](Check::message_args).
    fn message_template(&self) -> Option<Cow<'static, str>> {
        None
    }

    fn message_args(&self) -> Vec<FormatArg> {
        Vec::new()
    }

    /// Resource table this check's messages are bound to, if any.
    fn resource_table(&self) -> Option<&str> {
        None
    }
}
