//! Rule groups: every rule registered for one (model, member) pair.

use crate::core::{Member, Rule, RuleCheck, Transform};
use std::sync::Arc;

/// Ordered rules sharing a member.
///
/// Duplicate checks are allowed; a member may carry several rules of the
/// same kind with different conditions or messages.
#[derive(Clone, Debug)]
pub struct RuleGroup {
    member: Member,
    rules: Vec<Arc<Rule>>,
}

impl RuleGroup {
    pub fn new(member: Member) -> Self {
        Self {
            member,
            rules: Vec::new(),
        }
    }

    pub(crate) fn from_shared(member: Member, rules: Vec<Arc<Rule>>) -> Self {
        Self { member, rules }
    }

    /// Appends a rule. The rule must target this group's member.
    pub fn push(&mut self, rule: Rule) -> &mut Self {
        debug_assert_eq!(rule.member(), &self.member, "rule targets another member");
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The group's pre-validation transform, if any rule carries one.
    pub fn transform(&self) -> Option<&Transform> {
        self.rules.iter().find_map(|rule| rule.transform())
    }

    pub fn transform_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.transform().is_some())
            .count()
    }

    /// True if any evaluable rule needs awaiting. Markers never apply, so
    /// an empty `when_async` block does not count.
    pub fn is_async(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| !matches!(rule.check(), RuleCheck::Marker) && rule.is_async())
    }

    pub(crate) fn append(&mut self, other: RuleGroup) {
        self.rules.extend(other.rules);
    }

    pub(crate) fn into_rules(self) -> Vec<Arc<Rule>> {
        self.rules
    }
}
