//! Rules: a check plus its applicability condition and message metadata.

use super::check::{Check, CheckError};
use super::condition::Condition;
use super::model::{Member, Model};
use super::value::Value;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Function run once per member evaluation before any check, producing the
/// value the checks will see.
pub type Transform = Arc<dyn Fn(&dyn Model, &Member, Value) -> Value + Send + Sync>;

type AsyncPredicate =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<bool, CheckError>> + Send + Sync>;

/// Asynchronous check over an owned member value.
#[derive(Clone)]
pub struct AsyncCheck {
    kind: &'static str,
    predicate: AsyncPredicate,
}

impl AsyncCheck {
    pub fn new<F>(kind: &'static str, predicate: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, Result<bool, CheckError>> + Send + Sync + 'static,
    {
        Self {
            kind,
            predicate: Arc::new(predicate),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn run(&self, value: Value) -> BoxFuture<'static, Result<bool, CheckError>> {
        (self.predicate)(value)
    }
}

/// What a rule actually tests.
#[derive(Clone)]
pub enum RuleCheck {
    Value(Arc<dyn Check>),
    Async(AsyncCheck),
    /// Validate the member's nested model(s) with their own rule sets.
    Nested,
    /// Records an empty `when` block; never fails.
    Marker,
}

impl RuleCheck {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleCheck::Value(check) => check.kind(),
            RuleCheck::Async(check) => check.kind(),
            RuleCheck::Nested => "Nested",
            RuleCheck::Marker => "Marker",
        }
    }

    pub fn as_check(&self) -> Option<&dyn Check> {
        match self {
            RuleCheck::Value(check) => Some(check.as_ref()),
            _ => None,
        }
    }
}

/// Whether a rule tests the member value itself or each element of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Target {
    #[default]
    Member,
    Elements,
}

/// Where a rule came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuleSource {
    Declarative,
    #[default]
    Fluent,
}

/// The atomic unit of validation.
///
/// Rules are assembled by the builder (or by declarative seeding) and are
/// immutable once committed to a registry, where they are shared as
/// `Arc<Rule>`.
#[derive(Clone)]
pub struct Rule {
    pub(crate) id: Uuid,
    pub(crate) member: Member,
    pub(crate) condition: Condition,
    pub(crate) check: RuleCheck,
    pub(crate) target: Target,
    pub(crate) source: RuleSource,
    pub(crate) message: Option<String>,
    pub(crate) fallback_message: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) resource_key: Option<String>,
    pub(crate) resource_table: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) transform: Option<Transform>,
}

impl Rule {
    pub fn new(member: Member, check: RuleCheck) -> Self {
        Self {
            id: Uuid::new_v4(),
            member,
            condition: Condition::Always,
            check,
            target: Target::Member,
            source: RuleSource::Fluent,
            message: None,
            fallback_message: None,
            key: None,
            resource_key: None,
            resource_table: None,
            display_name: None,
            transform: None,
        }
    }

    pub fn with_check(member: Member, check: impl Check + 'static) -> Self {
        Self::new(member, RuleCheck::Value(Arc::new(check)))
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn each(mut self) -> Self {
        self.target = Target::Elements;
        self
    }

    pub fn declarative(mut self) -> Self {
        self.source = RuleSource::Declarative;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn check(&self) -> &RuleCheck {
        &self.check
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn source(&self) -> RuleSource {
        self.source
    }

    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn fallback_message(&self) -> Option<&str> {
        self.fallback_message.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Resource key used for message lookup: the explicit resource key, or
    /// the failure key when only that was given.
    pub fn resource_key(&self) -> Option<&str> {
        self.resource_key.as_deref().or(self.key.as_deref())
    }

    pub fn resource_table(&self) -> Option<&str> {
        self.resource_table.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn is_async(&self) -> bool {
        self.condition.is_async() || matches!(self.check, RuleCheck::Async(_))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("member", &self.member.name())
            .field("check", &self.check.kind())
            .field("target", &self.target)
            .field("condition", &self.condition)
            .field("source", &self.source)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}
