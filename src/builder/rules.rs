//! Fluent conditional rule builder.

use crate::builder::error::BuildError;
use crate::checks::{
    Compare, Equal, Length, MaxLength, MinLength, NotEmpty, Pattern, Predicate, Range, Required,
};
use crate::core::{
    member_of, AsyncCheck, Check, CheckError, Condition, Member, Model, Rule, RuleCheck, Target,
    Value,
};
use crate::registry::{MergeMode, RuleGroup, RuleRegistry};
use futures::FutureExt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy)]
struct Cursor {
    member: Member,
    target: Target,
}

struct Scope {
    condition: Condition,
    rules: Vec<Rule>,
}

impl Scope {
    fn new(condition: Condition) -> Self {
        Self {
            condition,
            rules: Vec::new(),
        }
    }
}

/// The condition of the most recent `when` block, available to one
/// immediately following `otherwise`.
struct Branch {
    condition: Condition,
    is_async: bool,
}

/// Builder composing `when`/`otherwise` blocks and checks into rules for `M`.
///
/// Scopes nest strictly: a `when` body runs against a fresh scope whose rules
/// are folded into the parent when the body returns, each rule's condition
/// conjoined with the block's. Metadata calls (`with_message`, `with_key`,
/// ...) apply to the most recent rule of the active scope. Nothing reaches
/// the registry until [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use precept::builder::RuleBuilder;
/// use precept::core::Model;
/// use precept::model;
/// use precept::registry::RuleRegistry;
///
/// struct Shipment {
///     express: bool,
///     courier: String,
/// }
///
/// model! {
///     Shipment {
///         fields: [express, courier],
///     }
/// }
///
/// let registry = RuleRegistry::new();
/// let mut rules = RuleBuilder::<Shipment>::new(&registry);
/// rules.when(
///     |s: &Shipment| s.express,
///     |rules| {
///         rules.rule_for("courier").required();
///     },
/// );
/// rules.build().unwrap();
///
/// assert!(registry.is_built(&Shipment::describe()));
/// ```
pub struct RuleBuilder<'r, M: Model> {
    registry: &'r RuleRegistry,
    merge: MergeMode,
    scopes: Vec<Scope>,
    cursor: Option<Cursor>,
    branch: Option<Branch>,
    is_async: bool,
    error: Option<BuildError>,
    _model: PhantomData<fn(&M)>,
}

impl<'r, M: Model> RuleBuilder<'r, M> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            merge: MergeMode::Preserve,
            scopes: vec![Scope::new(Condition::Always)],
            cursor: None,
            branch: None,
            is_async: false,
            error: None,
            _model: PhantomData,
        }
    }

    pub(crate) fn with_merge(mut self, merge: MergeMode) -> Self {
        self.merge = merge;
        self
    }

    /// Committed rules replace everything registered for their members.
    pub fn replace(&mut self) -> &mut Self {
        self.merge = MergeMode::Replace;
        self
    }

    /// Committed rules are appended after existing ones.
    pub fn preserve(&mut self) -> &mut Self {
        self.merge = MergeMode::Preserve;
        self
    }

    /// True once any async condition or check has been added.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Selects the member subsequent checks apply to.
    pub fn rule_for(&mut self, member: &str) -> &mut Self {
        self.select(member, Target::Member)
    }

    /// Selects a collection member; subsequent checks apply to each element.
    pub fn rule_for_each(&mut self, member: &str) -> &mut Self {
        self.select(member, Target::Elements)
    }

    pub fn required(&mut self) -> &mut Self {
        self.check(Required)
    }

    pub fn not_empty(&mut self) -> &mut Self {
        self.check(NotEmpty)
    }

    pub fn min_length(&mut self, min: usize) -> &mut Self {
        self.check(MinLength { min })
    }

    pub fn max_length(&mut self, max: usize) -> &mut Self {
        self.check(MaxLength { max })
    }

    pub fn length(&mut self, min: usize, max: usize) -> &mut Self {
        self.check(Length { min, max })
    }

    pub fn range(&mut self, min: impl Into<f64>, max: impl Into<f64>) -> &mut Self {
        self.check(Range::new(min, max))
    }

    /// Value must fully match `pattern`. An invalid pattern is a build error.
    pub fn matches(&mut self, pattern: &str) -> &mut Self {
        match Pattern::new(pattern) {
            Ok(pattern) => self.check(pattern),
            Err(err) => {
                self.branch = None;
                self.fail(BuildError::InvalidPattern(err.to_string()))
            }
        }
    }

    pub fn equal(&mut self, expected: impl Into<Value>) -> &mut Self {
        self.check(Equal {
            expected: expected.into(),
        })
    }

    /// Value must equal another member of the same instance.
    pub fn equal_to(&mut self, other: &str) -> &mut Self {
        match self.resolve(other) {
            Some(other) => self.check(Compare {
                other: other.name(),
            }),
            None => {
                self.branch = None;
                self
            }
        }
    }

    pub fn must<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check(Predicate::new(predicate))
    }

    /// Like [`must`](Self::must), but errors propagate out of validation
    /// instead of being recorded as failures.
    pub fn try_must<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Value) -> Result<bool, CheckError> + Send + Sync + 'static,
    {
        self.check(Predicate::fallible(predicate))
    }

    /// Adds an async predicate over the member value and marks the builder
    /// asynchronous.
    pub fn must_async<F, Fut>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.is_async = true;
        let check = AsyncCheck::new("MustAsync", move |value| predicate(value).map(Ok).boxed());
        self.push(RuleCheck::Async(check))
    }

    /// Adds any [`Check`] implementation.
    pub fn check(&mut self, check: impl Check + 'static) -> &mut Self {
        self.push(RuleCheck::Value(Arc::new(check)))
    }

    /// Validates the member's nested model(s) with their own rule sets.
    pub fn nested(&mut self) -> &mut Self {
        self.push(RuleCheck::Nested)
    }

    /// Opens a conditional block. Rules added by `body` apply only when
    /// `condition` holds (and every enclosing condition holds too).
    pub fn when<P, B>(&mut self, condition: P, body: B) -> &mut Self
    where
        P: Fn(&M) -> bool + Send + Sync + 'static,
        B: FnOnce(&mut Self),
    {
        self.block(Condition::new::<M, _>(condition), false, body)
    }

    pub fn when_async<P, Fut, B>(&mut self, condition: P, body: B) -> &mut Self
    where
        P: Fn(&M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
        B: FnOnce(&mut Self),
    {
        self.is_async = true;
        self.block(Condition::new_async::<M, _, _>(condition), true, body)
    }

    /// Rules added by `body` apply when the immediately preceding `when`
    /// condition does not hold.
    pub fn otherwise<B>(&mut self, body: B) -> &mut Self
    where
        B: FnOnce(&mut Self),
    {
        self.alternative(false, body)
    }

    pub fn otherwise_async<B>(&mut self, body: B) -> &mut Self
    where
        B: FnOnce(&mut Self),
    {
        self.alternative(true, body)
    }

    /// Literal message for the most recent rule; `{0}` is the display name.
    pub fn with_message(&mut self, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        self.amend("with_message", |rule| rule.message = Some(message))
    }

    /// Message used when no resource lookup succeeds and before the check's
    /// own template.
    pub fn with_fallback_message(&mut self, message: impl Into<String>) -> &mut Self {
        let message = message.into();
        self.amend("with_fallback_message", |rule| {
            rule.fallback_message = Some(message)
        })
    }

    /// Failure key; also used as the resource key when none is bound.
    pub fn with_key(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.amend("with_key", |rule| rule.key = Some(key))
    }

    pub fn with_resource(&mut self, key: impl Into<String>, table: impl Into<String>) -> &mut Self {
        let key = key.into();
        let table = table.into();
        self.amend("with_resource", |rule| {
            rule.resource_key = Some(key);
            rule.resource_table = Some(table);
        })
    }

    /// Display name used in messages and failure records.
    pub fn with_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.amend("with_name", |rule| rule.display_name = Some(name))
    }

    /// Attaches a transform run once per member evaluation, before any
    /// check. A member may have at most one, counting rules already in the
    /// registry unless this builder replaces them.
    pub fn before_validation<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(&M, &Member, Value) -> Value + Send + Sync + 'static,
    {
        self.branch = None;
        let Some(member) = self.current().map(|rule| *rule.member()) else {
            return self.fail(BuildError::NoRuleInScope("before_validation"));
        };

        let pending = self
            .scopes
            .iter()
            .flat_map(|scope| &scope.rules)
            .any(|rule| rule.member == member && rule.transform.is_some());
        let registered = self.merge == MergeMode::Preserve && self.registry.has_transform(&member);
        if pending || registered {
            return self.fail(BuildError::DuplicateTransform {
                model: member.owner().name(),
                member: member.name(),
            });
        }

        self.amend("before_validation", |rule| {
            rule.transform = Some(Arc::new(
                move |instance: &dyn Model, member: &Member, value: Value| {
                    match instance.as_any().downcast_ref::<M>() {
                        Some(instance) => transform(instance, member, value),
                        None => value,
                    }
                },
            ))
        })
    }

    /// Commits the rules to the registry and marks `M` as built.
    ///
    /// Returns the first configuration error recorded by any builder call,
    /// in which case nothing is committed.
    pub fn build(mut self) -> Result<(), BuildError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }

        let model = M::describe();
        let rules = self
            .scopes
            .pop()
            .map(|scope| scope.rules)
            .unwrap_or_default();

        let mut groups: Vec<RuleGroup> = Vec::new();
        for rule in rules {
            match groups.iter_mut().find(|group| group.member() == rule.member()) {
                Some(group) => {
                    group.push(rule);
                }
                None => {
                    let mut group = RuleGroup::new(*rule.member());
                    group.push(rule);
                    groups.push(group);
                }
            }
        }

        let added = self.registry.add_rules(model, groups, self.merge)?;
        self.registry.mark_built(model, true);
        debug!(
            model = model.name(),
            added,
            merge = ?self.merge,
            is_async = self.is_async,
            "built rules"
        );
        Ok(())
    }

    fn select(&mut self, name: &str, target: Target) -> &mut Self {
        self.branch = None;
        if let Some(member) = self.resolve(name) {
            self.cursor = Some(Cursor { member, target });
        }
        self
    }

    fn resolve(&mut self, name: &str) -> Option<Member> {
        let member = member_of::<M>(name);
        if member.is_none() {
            self.record(BuildError::UnknownMember {
                model: M::describe().name(),
                member: name.to_string(),
            });
        }
        member
    }

    fn push(&mut self, check: RuleCheck) -> &mut Self {
        self.branch = None;
        let Some(cursor) = self.cursor else {
            return self.fail(BuildError::NoMemberSelected);
        };

        let mut rule = Rule::new(cursor.member, check);
        rule.target = cursor.target;
        self.scope_mut().rules.push(rule);
        self
    }

    fn block<B>(&mut self, condition: Condition, is_async: bool, body: B) -> &mut Self
    where
        B: FnOnce(&mut Self),
    {
        let saved = self.cursor;
        self.scopes.push(Scope::new(condition.clone()));
        body(self);
        self.cursor = saved;

        let scope = match self.scopes.pop() {
            Some(scope) => scope,
            None => Scope::new(condition.clone()),
        };

        if scope.rules.is_empty() {
            let member = saved
                .map(|cursor| cursor.member)
                .unwrap_or_else(|| Member::model_level(M::describe()));
            let marker = Rule::new(member, RuleCheck::Marker).when(scope.condition);
            self.scope_mut().rules.push(marker);
        } else {
            let Scope { condition, rules } = scope;
            for mut rule in rules {
                rule.condition = condition.clone().and(rule.condition);
                self.scope_mut().rules.push(rule);
            }
        }

        self.branch = Some(Branch {
            condition,
            is_async,
        });
        self
    }

    fn alternative<B>(&mut self, is_async: bool, body: B) -> &mut Self
    where
        B: FnOnce(&mut Self),
    {
        let Some(branch) = self.branch.take() else {
            return self.fail(BuildError::OtherwiseWithoutWhen);
        };
        if branch.is_async != is_async {
            return self.fail(BuildError::OtherwiseMismatch);
        }

        self.block(branch.condition.negate(), is_async, body);
        self.branch = None;
        self
    }

    fn current(&self) -> Option<&Rule> {
        self.scopes.last().and_then(|scope| scope.rules.last())
    }

    fn amend<F>(&mut self, call: &'static str, apply: F) -> &mut Self
    where
        F: FnOnce(&mut Rule),
    {
        self.branch = None;
        match self.scopes.last_mut().and_then(|scope| scope.rules.last_mut()) {
            Some(rule) => {
                apply(rule);
                self
            }
            None => self.fail(BuildError::NoRuleInScope(call)),
        }
    }

    fn scope_mut(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            self.scopes.push(Scope::new(Condition::Always));
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn record(&mut self, err: BuildError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn fail(&mut self, err: BuildError) -> &mut Self {
        self.record(err);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model;

    struct Checkout {
        express: bool,
        gift: bool,
        courier: String,
        note: String,
        tags: Vec<String>,
    }

    model! {
        Checkout {
            fields: [express, gift, courier, note, tags],
        }
    }

    fn checkout(express: bool, gift: bool) -> Checkout {
        Checkout {
            express,
            gift,
            courier: String::new(),
            note: String::new(),
            tags: Vec::new(),
        }
    }

    fn member(name: &'static str) -> Member {
        Member::new(Checkout::describe(), name)
    }

    fn group(registry: &RuleRegistry, name: &'static str) -> RuleGroup {
        registry
            .group(&member(name))
            .unwrap_or_else(|| RuleGroup::new(member(name)))
    }

    #[test]
    fn checks_require_a_selected_member() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.required();

        assert_eq!(rules.build().unwrap_err(), BuildError::NoMemberSelected);
        assert!(!registry.is_built(&Checkout::describe()));
    }

    #[test]
    fn unknown_members_are_rejected() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.rule_for("coupon").required();

        assert_eq!(
            rules.build().unwrap_err(),
            BuildError::UnknownMember {
                model: "Checkout",
                member: "coupon".to_string()
            }
        );
    }

    #[test]
    fn first_error_wins_and_nothing_is_committed() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .rule_for("courier")
            .required()
            .matches("(")
            .otherwise(|_| {});

        assert!(matches!(
            rules.build().unwrap_err(),
            BuildError::InvalidPattern(_)
        ));
        assert!(registry.group(&member("courier")).is_none());
    }

    #[test]
    fn nested_blocks_conjoin_conditions() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.when(
            |c: &Checkout| c.express,
            |rules| {
                rules.when(
                    |c: &Checkout| c.gift,
                    |rules| {
                        rules.rule_for("note").required();
                    },
                );
            },
        );
        rules.build().unwrap();

        let note = group(&registry, "note");
        let condition = note.rules()[0].condition();
        for (express, gift) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(
                condition.evaluate_sync(&checkout(express, gift)),
                Some(express && gift)
            );
        }
    }

    #[test]
    fn otherwise_negates_the_preceding_when() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .when(
                |c: &Checkout| c.express,
                |rules| {
                    rules.rule_for("courier").required();
                },
            )
            .otherwise(|rules| {
                rules.rule_for("note").required();
            });
        rules.build().unwrap();

        let courier = group(&registry, "courier");
        let note = group(&registry, "note");
        for express in [true, false] {
            let instance = checkout(express, false);
            assert_eq!(
                courier.rules()[0].condition().evaluate_sync(&instance),
                Some(express)
            );
            assert_eq!(
                note.rules()[0].condition().evaluate_sync(&instance),
                Some(!express)
            );
        }
    }

    #[test]
    fn otherwise_must_follow_when() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .when(|c: &Checkout| c.express, |_| {})
            .rule_for("note")
            .otherwise(|_| {});

        assert_eq!(rules.build().unwrap_err(), BuildError::OtherwiseWithoutWhen);
    }

    #[test]
    fn otherwise_kind_must_match_when_kind() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .when_async(|c: &Checkout| std::future::ready(c.express), |_| {})
            .otherwise(|_| {});

        assert_eq!(rules.build().unwrap_err(), BuildError::OtherwiseMismatch);
    }

    #[test]
    fn empty_when_records_a_marker() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.rule_for("courier").when(|c: &Checkout| c.express, |_| {});
        rules.build().unwrap();

        let courier = group(&registry, "courier");
        assert_eq!(courier.len(), 1);
        assert!(matches!(courier.rules()[0].check(), RuleCheck::Marker));
        assert!(!courier.rules()[0].condition().is_always());
    }

    #[test]
    fn empty_async_block_leaves_the_group_sync() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .rule_for("courier")
            .when_async(|c: &Checkout| std::future::ready(c.express), |_| {});
        rules.build().unwrap();

        let courier = group(&registry, "courier");
        assert!(matches!(courier.rules()[0].check(), RuleCheck::Marker));
        assert!(!courier.is_async());
    }

    #[test]
    fn metadata_targets_the_most_recent_rule() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .rule_for("courier")
            .required()
            .with_message("first")
            .min_length(3)
            .with_key("courier.short")
            .with_name("Courier service");
        rules.build().unwrap();

        let courier = group(&registry, "courier");
        assert_eq!(courier.rules()[0].custom_message(), Some("first"));
        assert_eq!(courier.rules()[0].key(), None);
        assert_eq!(courier.rules()[1].key(), Some("courier.short"));
        assert_eq!(courier.rules()[1].display_name(), Some("Courier service"));
    }

    #[test]
    fn metadata_without_a_rule_in_scope_fails() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.rule_for("courier").required().when(
            |c: &Checkout| c.express,
            |rules| {
                rules.with_message("orphan");
            },
        );

        assert_eq!(
            rules.build().unwrap_err(),
            BuildError::NoRuleInScope("with_message")
        );
    }

    #[test]
    fn each_targets_collection_elements() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.rule_for_each("tags").not_empty();
        rules.build().unwrap();

        assert_eq!(group(&registry, "tags").rules()[0].target(), Target::Elements);
    }

    #[test]
    fn second_transform_in_builder_is_rejected() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules
            .rule_for("courier")
            .required()
            .before_validation(|_, _, value| value)
            .min_length(2)
            .before_validation(|_, _, value| value);

        assert_eq!(
            rules.build().unwrap_err(),
            BuildError::DuplicateTransform {
                model: "Checkout",
                member: "courier"
            }
        );
    }

    #[test]
    fn transform_conflicting_with_registry_is_rejected_unless_replacing() {
        let registry = RuleRegistry::new();
        let mut first = RuleBuilder::<Checkout>::new(&registry);
        first
            .rule_for("courier")
            .required()
            .before_validation(|_, _, value| value);
        first.build().unwrap();

        let mut second = RuleBuilder::<Checkout>::new(&registry);
        second
            .rule_for("courier")
            .required()
            .before_validation(|_, _, value| value);
        assert!(matches!(
            second.build().unwrap_err(),
            BuildError::DuplicateTransform { .. }
        ));

        let mut replacing = RuleBuilder::<Checkout>::new(&registry);
        replacing
            .replace()
            .rule_for("courier")
            .required()
            .before_validation(|_, _, value| value);
        assert!(replacing.build().is_ok());
        assert_eq!(group(&registry, "courier").len(), 1);
    }

    #[test]
    fn async_calls_mark_the_builder() {
        let registry = RuleRegistry::new();
        let mut rules = RuleBuilder::<Checkout>::new(&registry);
        rules.rule_for("courier").required();
        assert!(!rules.is_async());

        rules.must_async(|value| async move { !value.is_empty() });
        assert!(rules.is_async());
        rules.build().unwrap();

        assert!(group(&registry, "courier").is_async());
    }
}
