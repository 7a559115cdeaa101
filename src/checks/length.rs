//! Length checks over text (characters) and lists (items).
//!
//! A `Null` value passes every length check; combine with `Required` to
//! reject missing values.

use crate::core::{Check, CheckContext, CheckError, Value};
use crate::message::FormatArg;
use std::borrow::Cow;

fn measure(value: &Value) -> Option<usize> {
    value.len()
}

#[derive(Clone, Copy, Debug)]
pub struct MinLength {
    pub min: usize,
}

impl Check for MinLength {
    fn kind(&self) -> &'static str {
        "MinLength"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(measure(value).is_some_and(|len| len >= self.min))
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must be at least {1} characters long."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::scalar(self.min)]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MaxLength {
    pub max: usize,
}

impl Check for MaxLength {
    fn kind(&self) -> &'static str {
        "MaxLength"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(measure(value).is_some_and(|len| len <= self.max))
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed("{0} must be at most {1} characters long."))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::scalar(self.max)]
    }
}

/// Inclusive `[min, max]` length.
#[derive(Clone, Copy, Debug)]
pub struct Length {
    pub min: usize,
    pub max: usize,
}

impl Check for Length {
    fn kind(&self) -> &'static str {
        "Length"
    }

    fn validate(&self, value: &Value, _context: &CheckContext<'_>) -> Result<bool, CheckError> {
        if value.is_null() {
            return Ok(true);
        }
        Ok(measure(value).is_some_and(|len| (self.min..=self.max).contains(&len)))
    }

    fn message_template(&self) -> Option<Cow<'static, str>> {
        Some(Cow::Borrowed(
            "{0} must be between {1} and {2} characters long.",
        ))
    }

    fn message_args(&self) -> Vec<FormatArg> {
        vec![FormatArg::list([self.min, self.max])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::with_context;

    #[test]
    fn min_length_counts_characters() {
        with_context(|ctx| {
            let check = MinLength { min: 3 };
            assert!(!check.validate(&Value::from(""), ctx).unwrap());
            assert!(!check.validate(&Value::from("ab"), ctx).unwrap());
            assert!(check.validate(&Value::from("abc"), ctx).unwrap());
            assert!(check.validate(&Value::Null, ctx).unwrap());
        });
    }

    #[test]
    fn max_length_applies_to_lists() {
        with_context(|ctx| {
            let check = MaxLength { max: 2 };
            assert!(check.validate(&Value::from(vec![1, 2]), ctx).unwrap());
            assert!(!check.validate(&Value::from(vec![1, 2, 3]), ctx).unwrap());
        });
    }

    #[test]
    fn length_is_inclusive_and_rejects_non_measurable_values() {
        with_context(|ctx| {
            let check = Length { min: 2, max: 4 };
            assert!(check.validate(&Value::from("ab"), ctx).unwrap());
            assert!(check.validate(&Value::from("abcd"), ctx).unwrap());
            assert!(!check.validate(&Value::from("abcde"), ctx).unwrap());
            assert!(!check.validate(&Value::Int(3), ctx).unwrap());
        });
    }

    #[test]
    fn length_contributes_array_shaped_arguments() {
        let check = Length { min: 2, max: 4 };
        assert_eq!(
            check.message_args(),
            vec![FormatArg::List(vec!["2".to_string(), "4".to_string()])]
        );
    }
}
