//! Message resolution for validation failures.
//!
//! A failing rule's display text is chosen by the first source that yields
//! a string, in this order:
//!
//! 1. The rule's literal message override.
//! 2. The rule's resource key, looked up in the rule's resource table, else
//!    the check's table, else the shared table.
//! 3. When no key was given and convention lookup is enabled, the key
//!    `Member_CheckKind` in the same table.
//! 4. The rule's fallback message.
//! 5. The check's own message template.
//! 6. The generic message (`"Invalid value for {0}"` by default).
//!
//! A resource lookup that finds nothing falls through to the next source.

mod format;
mod resource;

pub use format::{format_message, FormatArg};
pub use resource::{NoResources, ResourceProvider, ResourceTables};

use crate::config::ValidatorOptions;
use crate::core::Rule;
use std::sync::Arc;
use tracing::trace;

/// Turns a failing rule into display-ready text.
#[derive(Clone)]
pub struct MessageResolver {
    resources: Arc<dyn ResourceProvider>,
    convention_lookup: bool,
    shared_table: Option<String>,
    generic_message: String,
}

impl MessageResolver {
    pub fn new(resources: Arc<dyn ResourceProvider>, options: &ValidatorOptions) -> Self {
        Self {
            resources,
            convention_lookup: options.convention_lookup,
            shared_table: options.shared_resource_table.clone(),
            generic_message: options.generic_message.clone(),
        }
    }

    pub fn resolve(&self, rule: &Rule, display_name: &str) -> String {
        let check = rule.check().as_check();
        let args = check.map(|c| c.message_args()).unwrap_or_default();
        let format = |template: &str| format_message(template, display_name, &args);

        if let Some(message) = rule.custom_message() {
            return format(message);
        }

        let table = rule
            .resource_table()
            .or_else(|| check.and_then(|c| c.resource_table()))
            .or(self.shared_table.as_deref());

        if let Some(key) = rule.resource_key() {
            if let Some(raw) = table.and_then(|table| self.resources.lookup(table, key)) {
                trace!(key, "message resolved from resource key");
                return format(&raw);
            }
        } else if self.convention_lookup {
            let key = format!("{}_{}", rule.member().name(), rule.check().kind());
            if let Some(raw) = table.and_then(|table| self.resources.lookup(table, &key)) {
                trace!(key = %key, "message resolved by convention");
                return format(&raw);
            }
        }

        if let Some(fallback) = rule.fallback_message() {
            return format(fallback);
        }

        if let Some(template) = check.and_then(|c| c.message_template()) {
            return format(&template);
        }

        format(&self.generic_message)
    }
}

impl Default for MessageResolver {
    fn default() -> Self {
        Self::new(Arc::new(NoResources), &ValidatorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{Length, Predicate, Required};
    use crate::core::{Member, Model, Rule};
    use crate::model;

    struct Account {
        password: String,
    }

    model! {
        Account {
            fields: [password],
        }
    }

    fn password() -> Member {
        Member::new(Account::describe(), "password")
    }

    fn resolver(tables: ResourceTables, options: ValidatorOptions) -> MessageResolver {
        MessageResolver::new(Arc::new(tables), &options)
    }

    fn shared_options() -> ValidatorOptions {
        ValidatorOptions {
            shared_resource_table: Some("Shared".to_string()),
            ..ValidatorOptions::default()
        }
    }

    #[test]
    fn literal_message_wins_over_everything() {
        let tables = ResourceTables::new().with("Shared", "pw.required", "from table");
        let mut rule = Rule::with_check(password(), Required).message("{0} please");
        rule.resource_key = Some("pw.required".to_string());
        rule.fallback_message = Some("fallback".to_string());

        let text = resolver(tables, shared_options()).resolve(&rule, "Password");
        assert_eq!(text, "Password please");
    }

    #[test]
    fn resource_key_prefers_rule_table() {
        let tables = ResourceTables::new()
            .with("Rule", "pw", "rule table for {0}")
            .with("Shared", "pw", "shared table");
        let mut rule = Rule::with_check(password(), Required);
        rule.resource_key = Some("pw".to_string());
        rule.resource_table = Some("Rule".to_string());

        let text = resolver(tables, shared_options()).resolve(&rule, "Password");
        assert_eq!(text, "rule table for Password");
    }

    #[test]
    fn failure_key_doubles_as_resource_key() {
        let tables = ResourceTables::new().with("Shared", "pw.key", "keyed");
        let mut rule = Rule::with_check(password(), Required);
        rule.key = Some("pw.key".to_string());

        let text = resolver(tables, shared_options()).resolve(&rule, "Password");
        assert_eq!(text, "keyed");
    }

    #[test]
    fn missing_resource_falls_through_to_fallback() {
        let mut rule = Rule::with_check(password(), Required);
        rule.resource_key = Some("absent".to_string());
        rule.fallback_message = Some("{0} needs attention".to_string());

        let text = resolver(ResourceTables::new(), shared_options()).resolve(&rule, "Password");
        assert_eq!(text, "Password needs attention");
    }

    #[test]
    fn convention_lookup_uses_member_and_kind() {
        let tables =
            ResourceTables::new().with("Shared", "password_Required", "convention {0}");
        let options = ValidatorOptions {
            convention_lookup: true,
            ..shared_options()
        };
        let rule = Rule::with_check(password(), Required);

        assert_eq!(
            resolver(tables.clone(), options).resolve(&rule, "Password"),
            "convention Password"
        );
        assert_eq!(
            resolver(tables, shared_options()).resolve(&rule, "Password"),
            "Password is required."
        );
    }

    #[test]
    fn explicit_key_disables_convention_lookup() {
        let tables = ResourceTables::new().with("Shared", "password_Required", "convention");
        let options = ValidatorOptions {
            convention_lookup: true,
            ..shared_options()
        };
        let mut rule = Rule::with_check(password(), Required);
        rule.resource_key = Some("absent".to_string());

        assert_eq!(
            resolver(tables, options).resolve(&rule, "Password"),
            "Password is required."
        );
    }

    #[test]
    fn check_template_receives_arguments() {
        let rule = Rule::with_check(password(), Length { min: 6, max: 20 });
        assert_eq!(
            MessageResolver::default().resolve(&rule, "Password"),
            "Password must be between 6 and 20 characters long."
        );
    }

    #[test]
    fn generic_message_is_the_last_resort() {
        let rule = Rule::with_check(password(), Predicate::new(|_| false));
        assert_eq!(
            MessageResolver::default().resolve(&rule, "Password"),
            "Invalid value for Password"
        );
    }
}
