//! Builder API for composing rules.
//!
//! [`RuleBuilder`] turns a sequence of fluent calls (`rule_for`, checks,
//! `when`/`otherwise` blocks, metadata overrides) into rules committed to a
//! registry. The [`model!`](crate::model) macro gives plain structs the
//! [`Model`](crate::core::Model) implementation the builder and the engine
//! rely on.

pub mod error;
pub mod macros;
pub mod rules;

pub use error::BuildError;
pub use rules::RuleBuilder;
