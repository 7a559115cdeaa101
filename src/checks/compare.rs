//! Equality checks against another member or a constant.

use crate::core::{Check, CheckContext, CheckError, Value};
use crate::message::FormatArg;
use std::borrow::Cow;

/// Value must equal another member of the same instance.
#[derive(Clone, Copy, Debug)]
pub struct Compare {
    pub other: &'static str,
}

impl Check for Compare {
    fn kind(&self) -> &'static str {
        "Compare"
    }

    fn validate(&self, value: &Value, context: &CheckContext<'_>) -> Result<bool, CheckError> {
        let other = context
            .instance
            .get(self.other)
            .ok_or_else(|| CheckError::UnknownMember(self.other.to_string()))?;
        Ok(*value == other)
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must match {1}."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::scalar(self.other)]
    }
}

/// Value must equal a constant.
#[derive(Clone, Debug)]
pub struct Equal {
    pub expected: Value,
}

impl Check for Equal {
    fn kind(&self) -> &'static str {
        "Equal"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        Ok(*value == self.expected)
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must be {1}."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::scalar(&self.expected)]
    }
}
