//! Thread-safe storage of rule groups per model type.
//!
//! The registry is an explicit value owned by the application (usually
//! through a [`Validator`](crate::engine::Validator)); there is no global
//! instance. Model types are sharded across a `DashMap`, each type entry
//! guards its member list with its own lock, and each rule group has its own
//! lock, so configuring unrelated types never contends and readers of one
//! member never wait on another.
//!
//! Reading the rules of a type is gated on that type having been built:
//! [`RuleRegistry::rules_for`] fails with [`RegistryError::NotFinalized`]
//! until [`RuleRegistry::mark_built`] is called.

mod error;
mod group;

pub use error::RegistryError;
pub use group::RuleGroup;

use crate::core::{Member, ModelType, Rule};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How incoming rules combine with rules already registered for a member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Append after the existing rules.
    #[default]
    Preserve,
    /// Empty the member's group first.
    Replace,
}

struct GroupCell {
    member: Member,
    rules: RwLock<Vec<Arc<Rule>>>,
}

impl GroupCell {
    fn new(member: Member) -> Self {
        Self {
            member,
            rules: RwLock::new(Vec::new()),
        }
    }

    fn snapshot(&self) -> RuleGroup {
        RuleGroup::from_shared(self.member, self.rules.read().clone())
    }
}

struct TypeRules {
    model: ModelType,
    groups: RwLock<Vec<Arc<GroupCell>>>,
    built: AtomicBool,
}

impl TypeRules {
    fn new(model: ModelType) -> Self {
        Self {
            model,
            groups: RwLock::new(Vec::new()),
            built: AtomicBool::new(false),
        }
    }

    fn find(&self, member: &Member) -> Option<Arc<GroupCell>> {
        self.groups
            .read()
            .iter()
            .find(|cell| cell.member == *member)
            .cloned()
    }
}

/// Rule storage shared by builders and the evaluation engine.
#[derive(Default)]
pub struct RuleRegistry {
    types: DashMap<TypeId, Arc<TypeRules>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, model: ModelType) -> Arc<TypeRules> {
        Arc::clone(
            self.types
                .entry(model.id())
                .or_insert_with(|| Arc::new(TypeRules::new(model)))
                .value(),
        )
    }

    fn existing(&self, model: &ModelType) -> Option<Arc<TypeRules>> {
        self.types
            .get(&model.id())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Appends a single rule to its member's group.
    pub fn add_rule(&self, rule: Rule) -> Result<(), RegistryError> {
        let member = *rule.member();
        let mut group = RuleGroup::new(member);
        group.push(rule);
        self.add_rules(member.owner(), vec![group], MergeMode::Preserve)
            .map(|_| ())
    }

    /// Merges groups into the registry, returning the number of rules added.
    ///
    /// Merges into one type are serialized by the type's member-list lock and
    /// applied all or nothing: a merge that would leave any member with two
    /// pre-validation transforms is rejected before a single group changes.
    pub fn add_rules(
        &self,
        model: ModelType,
        groups: Vec<RuleGroup>,
        mode: MergeMode,
    ) -> Result<usize, RegistryError> {
        let mut staged: Vec<RuleGroup> = Vec::with_capacity(groups.len());
        for group in groups {
            match staged.iter_mut().find(|held| held.member() == group.member()) {
                Some(held) => held.append(group),
                None => staged.push(group),
            }
        }
        if let Some(group) = staged.iter().find(|group| group.transform_count() > 1) {
            return Err(duplicate_transform(group.member()));
        }

        let entry = self.entry(model);
        let mut cells = entry.groups.write();

        if mode == MergeMode::Preserve {
            for group in staged.iter().filter(|group| group.transform().is_some()) {
                let taken = cells
                    .iter()
                    .find(|cell| cell.member == *group.member())
                    .is_some_and(|cell| cell.rules.read().iter().any(|rule| rule.transform().is_some()));
                if taken {
                    return Err(duplicate_transform(group.member()));
                }
            }
        }

        let mut added = 0;
        for group in staged {
            let member = *group.member();
            let cell = match cells.iter().find(|cell| cell.member == member) {
                Some(cell) => Arc::clone(cell),
                None => {
                    let cell = Arc::new(GroupCell::new(member));
                    cells.push(Arc::clone(&cell));
                    cell
                }
            };

            let mut rules = cell.rules.write();
            if mode == MergeMode::Replace {
                rules.clear();
            }
            added += group.len();
            rules.extend(group.into_rules());
            debug!(
                model = model.name(),
                member = member.name(),
                ?mode,
                total = rules.len(),
                "merged rule group"
            );
        }

        Ok(added)
    }

    /// Rule groups of a built type, in member registration order.
    pub fn rules_for(&self, model: &ModelType) -> Result<Vec<RuleGroup>, RegistryError> {
        let entry = self
            .existing(model)
            .filter(|entry| entry.built.load(Ordering::Acquire))
            .ok_or(RegistryError::NotFinalized {
                model: model.name(),
            })?;

        let groups = entry.groups.read();
        Ok(groups.iter().map(|cell| cell.snapshot()).collect())
    }

    /// Current group for a member, whether or not the type is built.
    pub fn group(&self, member: &Member) -> Option<RuleGroup> {
        self.existing(&member.owner())
            .and_then(|entry| entry.find(member))
            .map(|cell| cell.snapshot())
    }

    pub fn has_transform(&self, member: &Member) -> bool {
        self.group(member)
            .is_some_and(|group| group.transform().is_some())
    }

    /// Removes every rule of a member. Returns the number removed.
    pub fn remove_all(&self, member: &Member) -> usize {
        self.remove_where(member, |_| true)
    }

    /// Removes a member's rules whose check has the given kind.
    pub fn remove_check_kind(&self, member: &Member, kind: &str) -> usize {
        self.remove_where(member, |rule| rule.check().kind() == kind)
    }

    pub fn remove_where<F>(&self, member: &Member, predicate: F) -> usize
    where
        F: Fn(&Rule) -> bool,
    {
        let Some(cell) = self
            .existing(&member.owner())
            .and_then(|entry| entry.find(member))
        else {
            return 0;
        };

        let mut rules = cell.rules.write();
        let before = rules.len();
        rules.retain(|rule| !predicate(&**rule));
        let removed = before - rules.len();

        if removed > 0 {
            debug!(
                model = member.owner().name(),
                member = member.name(),
                removed,
                "removed rules"
            );
        }
        removed
    }

    /// Sets the built flag for a type. Idempotent.
    pub fn mark_built(&self, model: ModelType, built: bool) {
        let entry = self.entry(model);
        let previous = entry.built.swap(built, Ordering::AcqRel);
        if previous != built {
            debug!(model = entry.model.name(), built, "build status changed");
        }
    }

    pub fn is_built(&self, model: &ModelType) -> bool {
        self.existing(model)
            .is_some_and(|entry| entry.built.load(Ordering::Acquire))
    }

    /// True if the type has ever been configured or built.
    pub fn contains(&self, model: &ModelType) -> bool {
        self.types.contains_key(&model.id())
    }
}

fn duplicate_transform(member: &Member) -> RegistryError {
    RegistryError::DuplicateTransform {
        model: member.owner().name(),
        member: member.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{MinLength, Required};
    use crate::core::{Model, Value};
    use crate::model;
    use std::thread;

    struct Signup {
        email: String,
        password: String,
    }

    model! {
        Signup {
            fields: [email, password],
        }
    }

    fn member(name: &'static str) -> Member {
        Member::new(Signup::describe(), name)
    }

    fn required(name: &'static str) -> Rule {
        Rule::with_check(member(name), Required)
    }

    fn with_transform(rule: Rule) -> Rule {
        let mut rule = rule;
        rule.transform = Some(Arc::new(|_: &dyn Model, _: &Member, value: Value| value));
        rule
    }

    #[test]
    fn reading_unbuilt_type_fails() {
        let registry = RuleRegistry::new();
        registry.add_rule(required("email")).unwrap();

        assert_eq!(
            registry.rules_for(&Signup::describe()).unwrap_err(),
            RegistryError::NotFinalized { model: "Signup" }
        );

        registry.mark_built(Signup::describe(), true);
        assert_eq!(registry.rules_for(&Signup::describe()).unwrap().len(), 1);
    }

    #[test]
    fn unbuilding_reenables_the_gate() {
        let registry = RuleRegistry::new();
        registry.mark_built(Signup::describe(), true);
        registry.mark_built(Signup::describe(), true);
        assert!(registry.rules_for(&Signup::describe()).is_ok());

        registry.mark_built(Signup::describe(), false);
        assert!(registry.rules_for(&Signup::describe()).is_err());
    }

    #[test]
    fn preserve_appends_and_replace_empties() {
        let registry = RuleRegistry::new();
        registry.add_rule(required("password")).unwrap();

        let mut group = RuleGroup::new(member("password"));
        group.push(Rule::with_check(member("password"), MinLength { min: 6 }));
        registry
            .add_rules(Signup::describe(), vec![group.clone()], MergeMode::Preserve)
            .unwrap();
        assert_eq!(registry.group(&member("password")).unwrap().len(), 2);

        registry
            .add_rules(Signup::describe(), vec![group], MergeMode::Replace)
            .unwrap();
        let current = registry.group(&member("password")).unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current.rules()[0].check().kind(), "MinLength");
    }

    #[test]
    fn groups_keep_member_registration_order() {
        let registry = RuleRegistry::new();
        registry.add_rule(required("password")).unwrap();
        registry.add_rule(required("email")).unwrap();
        registry.mark_built(Signup::describe(), true);

        let names: Vec<_> = registry
            .rules_for(&Signup::describe())
            .unwrap()
            .iter()
            .map(|group| group.member().name())
            .collect();
        assert_eq!(names, vec!["password", "email"]);
    }

    #[test]
    fn removal_by_member_and_kind() {
        let registry = RuleRegistry::new();
        registry.add_rule(required("password")).unwrap();
        registry
            .add_rule(Rule::with_check(member("password"), MinLength { min: 6 }))
            .unwrap();
        registry.add_rule(required("password")).unwrap();

        assert_eq!(registry.remove_check_kind(&member("password"), "Required"), 2);
        assert_eq!(registry.remove_all(&member("password")), 1);
        assert_eq!(registry.remove_all(&member("email")), 0);
    }

    #[test]
    fn second_transform_is_rejected() {
        let registry = RuleRegistry::new();
        registry
            .add_rule(with_transform(required("email")))
            .unwrap();
        assert!(registry.has_transform(&member("email")));

        let err = registry
            .add_rule(with_transform(required("email")))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTransform {
                model: "Signup",
                member: "email"
            }
        );

        let mut replacement = RuleGroup::new(member("email"));
        replacement.push(with_transform(required("email")));
        assert!(registry
            .add_rules(Signup::describe(), vec![replacement], MergeMode::Replace)
            .is_ok());
    }

    #[test]
    fn rejected_merge_changes_no_group() {
        let registry = RuleRegistry::new();
        registry
            .add_rule(with_transform(required("email")))
            .unwrap();

        let mut password = RuleGroup::new(member("password"));
        password.push(required("password"));
        let mut email = RuleGroup::new(member("email"));
        email.push(with_transform(required("email")));

        let err = registry
            .add_rules(
                Signup::describe(),
                vec![password, email],
                MergeMode::Preserve,
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTransform { member: "email", .. }));
        assert!(registry.group(&member("password")).is_none());
        assert_eq!(registry.group(&member("email")).unwrap().len(), 1);
    }

    #[test]
    fn groups_for_one_member_are_combined() {
        let registry = RuleRegistry::new();
        let mut first = RuleGroup::new(member("email"));
        first.push(with_transform(required("email")));
        let mut second = RuleGroup::new(member("email"));
        second.push(with_transform(required("email")));

        assert!(registry
            .add_rules(Signup::describe(), vec![first, second], MergeMode::Replace)
            .is_err());
        assert!(registry.group(&member("email")).is_none());
    }

    #[test]
    fn concurrent_merges_keep_every_rule() {
        let registry = RuleRegistry::new();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        registry.add_rule(required("email")).unwrap();
                    }
                });
            }
        });

        assert_eq!(registry.group(&member("email")).unwrap().len(), 200);
    }
}
