//! Errors that abort a validation call.

use crate::core::CheckError;
use crate::registry::RegistryError;
use thiserror::Error;

/// A validation call that could not produce a report.
///
/// Expected rule failures never appear here; they are collected into the
/// [`ValidationReport`](super::ValidationReport).
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("check '{kind}' failed to run at '{path}': {source}")]
    Check {
        path: String,
        kind: &'static str,
        #[source]
        source: CheckError,
    },

    #[error("{model} has no member '{member}'")]
    UnknownMember { model: &'static str, member: String },

    #[error("validation was cancelled")]
    Cancelled,

    #[error("{model}.{member} has async rules. Call validate_async instead")]
    AsyncRequired {
        model: &'static str,
        member: &'static str,
    },
}
