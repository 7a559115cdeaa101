//! Numeric range check.

use crate::core::{Check, CheckContext, CheckError, Value};
use crate::message::FormatArg;
use std::borrow::Cow;

/// Inclusive numeric range. Non-numeric values fail; `Null` passes.
#[derive(Clone, Copy, Debug)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }
}

impl Check for Range {
    fn kind(&self) -> &'static str {
        "Range"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(value
            .as_f64()
            .is_some_and(|n| n >= self.min && n <= self.max))
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must be between {1} and {2}."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::list([self.min, self.max])]
    }
}
