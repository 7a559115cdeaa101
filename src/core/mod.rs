//! Core validation types.
//!
//! This module contains the building blocks every other layer works with:
//! - Dynamic member values via `Value`
//! - The `Model` trait that replaces runtime reflection
//! - Applicability predicates via `Condition`
//! - Reusable checks via the `Check` trait
//! - `Rule`, which ties a check to a member, a condition and message metadata

mod check;
mod condition;
mod model;
mod rule;
mod value;

pub use check::{Check, CheckContext, CheckError};
pub use condition::Condition;
pub use model::{member_of, Children, Member, Model, ModelType};
pub use rule::{AsyncCheck, Rule, RuleCheck, RuleSource, Target, Transform};
pub use value::{FromValue, Value};
