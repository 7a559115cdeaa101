//! Applicability predicates for rules.
//!
//! A [`Condition`] decides whether a rule applies to a model instance. The
//! fluent builder composes conditions by conjunction and negation as `when`
//! and `otherwise` blocks nest, so a rule deep inside several blocks carries
//! the whole chain of enclosing predicates.

use super::model::Model;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type SyncPredicate = Arc<dyn Fn(&dyn Model) -> bool + Send + Sync>;
type AsyncPredicate = Arc<dyn Fn(&dyn Model) -> BoxFuture<'static, bool> + Send + Sync>;

/// Pure predicate over a model instance.
///
/// Typed predicates are erased at construction; an instance of a different
/// type never satisfies them.
///
/// # Example
///
/// ```rust
/// use precept::core::Condition;
/// use precept::model;
///
/// struct Account {
///     active: bool,
/// }
///
/// model! {
///     Account {
///         fields: [active],
///     }
/// }
///
/// let active = Condition::new(|a: &Account| a.active);
/// let inactive = active.clone().negate();
///
/// assert_eq!(active.evaluate_sync(&Account { active: true }), Some(true));
/// assert_eq!(inactive.evaluate_sync(&Account { active: true }), Some(false));
/// ```
#[derive(Clone, Default)]
pub enum Condition {
    #[default]
    Always,
    Sync(SyncPredicate),
    Async(AsyncPredicate),
    And(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn new<M, F>(predicate: F) -> Self
    where
        M: Model,
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        Condition::Sync(Arc::new(move |model: &dyn Model| {
            model
                .as_any()
                .downcast_ref::<M>()
                .is_some_and(|model| predicate(model))
        }))
    }

    pub fn new_async<M, F, Fut>(predicate: F) -> Self
    where
        M: Model,
        F: Fn(&M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        Condition::Async(Arc::new(move |model: &dyn Model| {
            match model.as_any().downcast_ref::<M>() {
                Some(model) => predicate(model).boxed(),
                None => future::ready(false).boxed(),
            }
        }))
    }

    /// `self ∧ other`, evaluated left to right.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Condition::Always, other) => other,
            (this, Condition::Always) => this,
            (this, other) => Condition::And(Box::new(this), Box::new(other)),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Condition::Not(inner) => *inner,
            other => Condition::Not(Box::new(other)),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }

    /// True if any part of the condition must be awaited.
    pub fn is_async(&self) -> bool {
        match self {
            Condition::Always | Condition::Sync(_) => false,
            Condition::Async(_) => true,
            Condition::And(left, right) => left.is_async() || right.is_async(),
            Condition::Not(inner) => inner.is_async(),
        }
    }

    /// Evaluates without awaiting. Returns `None` for asynchronous conditions.
    pub fn evaluate_sync(&self, model: &dyn Model) -> Option<bool> {
        if self.is_async() {
            return None;
        }
        Some(self.evaluate_now(model))
    }

    fn evaluate_now(&self, model: &dyn Model) -> bool {
        match self {
            Condition::Always => true,
            Condition::Sync(predicate) => predicate(model),
            Condition::Async(_) => false,
            Condition::And(left, right) => left.evaluate_now(model) && right.evaluate_now(model),
            Condition::Not(inner) => !inner.evaluate_now(model),
        }
    }

    /// Evaluates the condition, awaiting asynchronous parts with
    /// short-circuiting conjunction.
    pub fn evaluate<'a>(&'a self, model: &'a dyn Model) -> BoxFuture<'a, bool> {
        match self {
            Condition::Always => future::ready(true).boxed(),
            Condition::Sync(predicate) => future::ready(predicate(model)).boxed(),
            Condition::Async(predicate) => predicate(model),
            Condition::And(left, right) => async move {
                if !left.evaluate(model).await {
                    return false;
                }
                right.evaluate(model).await
            }
            .boxed(),
            Condition::Not(inner) => inner.evaluate(model).map(|holds| !holds).boxed(),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("Always"),
            Condition::Sync(_) => f.write_str("Sync(..)"),
            Condition::Async(_) => f.write_str("Async(..)"),
            Condition::And(left, right) => f.debug_tuple("And").field(left).field(right).finish(),
            Condition::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}
