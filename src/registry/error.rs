//! Registry errors.

use thiserror::Error;

/// Errors raised by the rule registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Rules for '{model}' are not finalized. Call build() before reading them")]
    NotFinalized { model: &'static str },

    #[error("Member '{member}' of '{model}' already has a pre-validation transform")]
    DuplicateTransform {
        model: &'static str,
        member: &'static str,
    },
}
