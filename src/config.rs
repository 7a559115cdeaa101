//! Validator configuration.

use crate::registry::MergeMode;
use serde::{Deserialize, Serialize};

/// Options shared by the builder, the engine and the message resolver.
///
/// Every field has a default, so partial JSON documents are accepted.
///
/// # Example
///
/// ```rust
/// use precept::config::ValidatorOptions;
/// use precept::registry::MergeMode;
///
/// let options = ValidatorOptions::from_json(
///     r#"{ "convention_lookup": true, "merge_mode": "replace" }"#,
/// )
/// .unwrap();
///
/// assert!(options.convention_lookup);
/// assert_eq!(options.merge_mode, MergeMode::Replace);
/// assert_eq!(options.generic_message, "Invalid value for {0}");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Look up `Member_CheckKind` resource keys when a rule names no key.
    pub convention_lookup: bool,

    /// Resource table used when neither the rule nor the check names one.
    pub shared_resource_table: Option<String>,

    /// Last-resort message template; `{0}` is the member's display name.
    pub generic_message: String,

    /// How builder commits treat rules already registered for a member.
    pub merge_mode: MergeMode,

    /// Drop repeated failures of the same rule at the same path.
    pub deduplicate: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            convention_lookup: false,
            shared_resource_table: None,
            generic_message: "Invalid value for {0}".to_string(),
            merge_mode: MergeMode::Preserve,
            deduplicate: true,
        }
    }
}

impl ValidatorOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let options = ValidatorOptions::from_json("{}").unwrap();
        assert_eq!(options, ValidatorOptions::default());
    }

    #[test]
    fn unknown_merge_mode_is_rejected() {
        assert!(ValidatorOptions::from_json(r#"{ "merge_mode": "overwrite" }"#).is_err());
    }

    #[test]
    fn options_roundtrip_through_json() {
        let options = ValidatorOptions {
            shared_resource_table: Some("Errors".to_string()),
            deduplicate: false,
            ..ValidatorOptions::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(ValidatorOptions::from_json(&json).unwrap(), options);
    }
}
