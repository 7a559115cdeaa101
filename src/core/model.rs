//! The `Model` trait and member identities.
//!
//! A model is any data-transfer object whose members can be read (and
//! optionally written) by name. The [`model!`](crate::model) macro derives
//! the implementation for plain structs.

use super::value::Value;
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a model type.
///
/// Two `ModelType`s are equal when they describe the same Rust type; the
/// name is only carried for display.
#[derive(Clone, Copy, Debug)]
pub struct ModelType {
    id: TypeId,
    name: &'static str,
}

impl ModelType {
    pub fn of<M: 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<M>(),
            name,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for ModelType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// A named member declared on a model type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Member {
    owner: ModelType,
    name: &'static str,
}

impl Member {
    pub fn new(owner: ModelType, name: &'static str) -> Self {
        Self { owner, name }
    }

    /// Placeholder member used by rules that belong to the model as a whole,
    /// such as the marker recorded for an empty `when` block.
    pub fn model_level(owner: ModelType) -> Self {
        Self { owner, name: "" }
    }

    pub fn owner(&self) -> ModelType {
        self.owner
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_model_level(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// Mutable access to the models nested under one member.
pub enum Children<'a> {
    One(&'a mut dyn Model),
    Many(Vec<&'a mut dyn Model>),
}

/// A validatable data-transfer object.
///
/// The trait is object safe so the engine can walk heterogeneous nested
/// models; the `Self: Sized` methods give the builder static knowledge of
/// the type.
pub trait Model: Any + Send + Sync {
    fn describe() -> ModelType
    where
        Self: Sized;

    /// Names of every member the model exposes.
    fn members() -> &'static [&'static str]
    where
        Self: Sized;

    fn model_type(&self) -> ModelType;

    fn as_any(&self) -> &dyn Any;

    /// Current value of `member`, or `None` if the model has no such member.
    fn get(&self, member: &str) -> Option<Value>;

    /// Writes `value` back into `member`.
    ///
    /// Returns `false` when the member has no setter or the value does not
    /// fit the field.
    fn set(&mut self, _member: &str, _value: Value) -> bool {
        false
    }

    fn children_mut(&mut self, _member: &str) -> Option<Children<'_>> {
        None
    }
}

/// Looks up the static name of `member` on `M`.
pub fn member_of<M: Model>(member: &str) -> Option<Member> {
    M::members()
        .iter()
        .find(|name| **name == member)
        .map(|name| Member::new(M::describe(), name))
}
