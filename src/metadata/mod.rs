//! Declarative metadata: rules discovered from static annotations.
//!
//! Discovery itself (attribute scanning, code generation, configuration
//! files) lives outside this crate. A [`MetadataProvider`] hands over plain
//! `(member, check, message)` declarations, which are registered as the
//! low-priority initial rules of a type. Fluent configuration may later
//! preserve or replace them.

use crate::core::{member_of, Check, Model, ModelType, Rule, RuleCheck};
use crate::registry::{MergeMode, RegistryError, RuleGroup, RuleRegistry};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// One statically declared check on a member.
#[derive(Clone)]
pub struct Declaration {
    pub member: &'static str,
    pub check: Arc<dyn Check>,
    pub message: Option<String>,
}

impl Declaration {
    pub fn new(member: &'static str, check: impl Check + 'static) -> Self {
        Self {
            member,
            check: Arc::new(check),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Source of declarative rules per model type.
pub trait MetadataProvider: Send + Sync {
    fn declarations(&self, model: &ModelType) -> Vec<Declaration>;
}

/// Declarations registered by hand, keyed by model type.
///
/// # Example
///
/// ```rust
/// use precept::checks::Required;
/// use precept::core::Model;
/// use precept::metadata::{Declaration, MetadataProvider, StaticMetadata};
/// use precept::model;
///
/// struct Contact {
///     email: String,
/// }
///
/// model! {
///     Contact {
///         fields: [email],
///     }
/// }
///
/// let metadata = StaticMetadata::new()
///     .declare::<Contact>(Declaration::new("email", Required));
///
/// assert_eq!(metadata.declarations(&Contact::describe()).len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct StaticMetadata {
    entries: HashMap<TypeId, Vec<Declaration>>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare<M: Model>(mut self, declaration: Declaration) -> Self {
        self.entries
            .entry(TypeId::of::<M>())
            .or_default()
            .push(declaration);
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn declarations(&self, model: &ModelType) -> Vec<Declaration> {
        self.entries.get(&model.id()).cloned().unwrap_or_default()
    }
}

/// Registers the provider's declarations for `M` as declarative rules.
///
/// Declarations naming members `M` does not expose are skipped. Returns the
/// number of rules registered.
pub fn seed<M: Model>(
    registry: &RuleRegistry,
    provider: &dyn MetadataProvider,
) -> Result<usize, RegistryError> {
    let model = M::describe();
    let mut groups: Vec<RuleGroup> = Vec::new();

    for declaration in provider.declarations(&model) {
        let Some(member) = member_of::<M>(declaration.member) else {
            warn!(
                model = model.name(),
                member = declaration.member,
                "skipping declaration for unknown member"
            );
            continue;
        };

        let mut rule = Rule::new(member, RuleCheck::Value(declaration.check)).declarative();
        rule.message = declaration.message;

        match groups.iter_mut().find(|group| *group.member() == member) {
            Some(group) => {
                group.push(rule);
            }
            None => {
                let mut group = RuleGroup::new(member);
                group.push(rule);
                groups.push(group);
            }
        }
    }

    let added = registry.add_rules(model, groups, MergeMode::Preserve)?;
    debug!(model = model.name(), added, "seeded declarative rules");
    Ok(added)
}
