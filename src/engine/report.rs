//! Failure records and the validation report.

use super::path::MemberPath;
use crate::core::Value;
use serde::Serialize;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use uuid::Uuid;

/// One failed rule at one location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Failure {
    /// Full location, e.g. `items[4].products[0].orders[1]`.
    pub path: MemberPath,
    pub member: &'static str,
    pub display_name: String,
    pub attempted_value: Value,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Identity of the rule that failed; equal for every failure it produces.
    pub rule_id: Uuid,
    pub check_kind: &'static str,
}

/// Outcome of validating one instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    failures: Vec<Failure>,
}

impl ValidationReport {
    pub fn new(failures: Vec<Failure>) -> Self {
        Self { failures }
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in evaluation order.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    /// Failures recorded at exactly `path` (as rendered, e.g. `lines[0].sku`).
    pub fn failures_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Failure> + 'a {
        self.failures
            .iter()
            .filter(move |failure| failure.path.to_string() == path)
    }

    /// The report as an accumulated `Validation`: success when no rule
    /// failed, otherwise every failure.
    pub fn to_validation(&self) -> Validation<(), NonEmptyVec<Failure>> {
        let checks: Vec<Validation<(), NonEmptyVec<Failure>>> = self
            .failures
            .iter()
            .cloned()
            .map(Validation::fail)
            .collect();
        Validation::all_vec(checks).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(path: MemberPath, member: &'static str, message: &str) -> Failure {
        Failure {
            path,
            member,
            display_name: member.to_string(),
            attempted_value: Value::Null,
            message: message.to_string(),
            key: None,
            rule_id: Uuid::new_v4(),
            check_kind: "Required",
        }
    }

    #[test]
    fn empty_report_is_valid() {
        let report = ValidationReport::default();
        assert!(report.is_valid());
        assert!(report.to_validation().is_success());
    }

    #[test]
    fn to_validation_accumulates_every_failure() {
        let report = ValidationReport::new(vec![
            failure(MemberPath::root().member("email"), "email", "a"),
            failure(MemberPath::root().member("name"), "name", "b"),
        ]);

        match report.to_validation() {
            Validation::Failure(failures) => {
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().any(|f| f.message == "a"));
                assert!(failures.iter().any(|f| f.message == "b"));
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn failures_at_matches_rendered_paths() {
        let lines = MemberPath::root().member("lines");
        let report = ValidationReport::new(vec![
            failure(lines.index(0).member("sku"), "sku", "first"),
            failure(lines.index(1).member("sku"), "sku", "second"),
        ]);

        let found: Vec<_> = report.failures_at("lines[1].sku").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "second");
    }

    #[test]
    fn failures_serialize_with_their_path() {
        let report = ValidationReport::new(vec![failure(
            MemberPath::root().member("email"),
            "email",
            "Email is required.",
        )]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["failures"][0]["path"], "email");
        assert_eq!(json["failures"][0]["check_kind"], "Required");
        assert!(json["failures"][0].get("key").is_none());
    }
}
