//! Precept: conditional, composable validation rules for data-transfer objects
//!
//! Rules attach to the members of plain structs. Declarative rules (seeded
//! from static metadata) coexist with rules composed through a fluent
//! builder that supports conditional `when`/`otherwise` blocks, inline
//! predicates, nested collection traversal and message overrides. One
//! evaluation algorithm serves both synchronous and asynchronous validation.
//!
//! # Core Concepts
//!
//! - **Model**: a struct exposing its members through the `Model` trait,
//!   usually generated with [`model!`]
//! - **Rule**: a check plus an applicability `Condition` and message metadata
//! - **Registry**: rule groups per model type, gated by a build flag
//! - **Validator**: configures rules and produces a `ValidationReport`
//!
//! # Example
//!
//! ```rust
//! use precept::prelude::*;
//!
//! struct Account {
//!     business: bool,
//!     company: String,
//!     email: String,
//! }
//!
//! model! {
//!     Account {
//!         fields: [business, company, email],
//!     }
//! }
//!
//! let validator = Validator::new();
//! let mut rules = validator.configure::<Account>();
//! rules
//!     .rule_for("email")
//!     .required()
//!     .matches(r"[^@\s]+@[^@\s]+")
//!     .with_message("{0} must be an email address");
//! rules.when(
//!     |a: &Account| a.business,
//!     |rules| {
//!         rules.rule_for("company").required();
//!     },
//! );
//! rules.build().unwrap();
//!
//! let mut account = Account {
//!     business: true,
//!     company: String::new(),
//!     email: "not-an-email".to_string(),
//! };
//! let report = validator.validate(&mut account).unwrap();
//!
//! let messages: Vec<_> = report.failures().iter().map(|f| f.message.as_str()).collect();
//! assert_eq!(
//!     messages,
//!     vec!["email must be an email address", "company is required."]
//! );
//! ```

pub mod builder;
pub mod checks;
pub mod config;
pub mod core;
pub mod engine;
pub mod message;
pub mod metadata;
pub mod registry;

// Re-export commonly used types
pub use builder::{BuildError, RuleBuilder};
pub use config::ValidatorOptions;
pub use core::{Check, CheckError, Condition, Member, Model, Rule, Value};
pub use engine::{Failure, MemberPath, ValidateError, ValidationReport, Validator};
pub use registry::{MergeMode, RegistryError, RuleRegistry};

/// Everything needed to declare models, configure rules and validate.
pub mod prelude {
    pub use crate::builder::{BuildError, RuleBuilder};
    pub use crate::config::ValidatorOptions;
    pub use crate::core::{Check, CheckContext, CheckError, Condition, Member, Model, Value};
    pub use crate::engine::{Failure, ValidateError, ValidationReport, Validator};
    pub use crate::message::ResourceTables;
    pub use crate::model;
    pub use crate::registry::MergeMode;
}
