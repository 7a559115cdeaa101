//! Presence checks.

use crate::core::{Check, CheckContext, CheckError, Value};
use std::borrow::Cow;

/// Fails on `Null` and on blank text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Required;

impl Check for Required {
    fn kind(&self) -> &'static str {
        "Required"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        Ok(match value {
            Value::Null => false,
            Value::Text(text) => !text.trim().is_empty(),
            _ => true,
        })
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} is required."))
    }
}

/// Fails on `Null`, blank text and empty lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct NotEmpty;

impl Check for NotEmpty {
    fn kind(&self) -> &'static str {
        "NotEmpty"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        Ok(!value.is_empty())
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must not be empty."))
    }
}
