//! Regular expression check.

use crate::core::{Check, CheckContext, CheckError, Value};
use crate::message::FormatArg;
use regex::Regex;
use std::borrow::Cow;

/// Text must match the whole pattern. `Null` passes; other shapes fail.
#[derive(Clone, Debug)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    /// The pattern as written, without the anchoring.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Check for Pattern {
    fn kind(&self) -> &'static str {
        "Pattern"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        Ok(match value {
            Value::Null => true,
            Value::Text(text) => self.regex.is_match(text),
            _ => false,
        })
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} has an invalid format."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::scalar(self.source.as_str())]
    }
}
