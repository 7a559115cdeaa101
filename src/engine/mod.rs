//! Validation engine and the [`Validator`] facade.
//!
//! The facade owns a registry, a message resolver and the options tying them
//! together. It hands out builders for configuration and runs the shared
//! evaluation algorithm synchronously or asynchronously.

mod aggregator;
mod error;
mod path;
mod report;

pub use error::ValidateError;
pub use path::{MemberPath, PathSegment};
pub use report::{Failure, ValidationReport};

use crate::builder::{BuildError, RuleBuilder};
use crate::config::ValidatorOptions;
use crate::core::{member_of, Model};
use crate::message::{MessageResolver, NoResources, ResourceProvider};
use crate::metadata::{self, MetadataProvider};
use crate::registry::{RegistryError, RuleRegistry};
use aggregator::{Aggregator, Mode};
use futures::FutureExt;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Entry point for configuring and running validation.
///
/// # Example
///
/// ```rust
/// use precept::engine::Validator;
/// use precept::model;
///
/// struct Signup {
///     password: String,
/// }
///
/// model! {
///     Signup {
///         fields: [password],
///     }
/// }
///
/// let validator = Validator::new();
/// let mut rules = validator.configure::<Signup>();
/// rules.rule_for("password").required().min_length(6);
/// rules.build().unwrap();
///
/// let mut signup = Signup { password: String::new() };
/// let report = validator.validate(&mut signup).unwrap();
///
/// assert!(!report.is_valid());
/// assert_eq!(report.failures().len(), 2);
/// ```
#[derive(Clone)]
pub struct Validator {
    registry: Arc<RuleRegistry>,
    messages: MessageResolver,
    options: ValidatorOptions,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_options(ValidatorOptions::default())
    }

    pub fn with_options(options: ValidatorOptions) -> Self {
        Self {
            registry: Arc::new(RuleRegistry::new()),
            messages: MessageResolver::new(Arc::new(NoResources), &options),
            options,
        }
    }

    /// Uses `resources` for message lookups.
    pub fn with_resources(mut self, resources: Arc<dyn ResourceProvider>) -> Self {
        self.messages = MessageResolver::new(resources, &self.options);
        self
    }

    /// Shares an existing registry, e.g. one seeded elsewhere.
    pub fn with_registry(mut self, registry: Arc<RuleRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Starts a configuration pass for `M`, merging per the configured mode.
    pub fn configure<M: Model>(&self) -> RuleBuilder<'_, M> {
        RuleBuilder::new(&self.registry).with_merge(self.options.merge_mode)
    }

    /// Marks `M` as built without adding rules, e.g. after seeding.
    pub fn build<M: Model>(&self) -> Result<(), BuildError> {
        self.registry.mark_built(M::describe(), true);
        Ok(())
    }

    /// Registers declarative rules for `M` from `provider`.
    pub fn seed<M: Model>(&self, provider: &dyn MetadataProvider) -> Result<usize, RegistryError> {
        metadata::seed::<M>(&self.registry, provider)
    }

    /// Validates `instance`, failing with [`ValidateError::AsyncRequired`]
    /// when any reached rule must be awaited.
    pub fn validate<M: Model>(&self, instance: &mut M) -> Result<ValidationReport, ValidateError> {
        self.run_sync(instance, None)
    }

    /// Validates a single member of `instance`, including nested models
    /// reached through it. Fails with [`ValidateError::UnknownMember`] when
    /// `M` has no such member.
    pub fn validate_member<M: Model>(
        &self,
        instance: &mut M,
        member: &str,
    ) -> Result<ValidationReport, ValidateError> {
        let member = member_of::<M>(member).ok_or_else(|| ValidateError::UnknownMember {
            model: M::describe().name(),
            member: member.to_string(),
        })?;
        self.run_sync(instance, Some(member.name()))
    }

    /// Validates `instance`, awaiting async conditions and checks.
    ///
    /// `cancel` is observed before each rule and before each nested model;
    /// cancellation discards partial results.
    pub async fn validate_async<M: Model>(
        &self,
        instance: &mut M,
        cancel: &CancellationToken,
    ) -> Result<ValidationReport, ValidateError> {
        let aggregator = self.aggregator(Mode::Async, Some(cancel));
        let failures = aggregator
            .validate_model(instance, MemberPath::root(), None)
            .await?;
        Ok(self.finish(M::describe().name(), failures))
    }

    fn run_sync<M: Model>(
        &self,
        instance: &mut M,
        only: Option<&'static str>,
    ) -> Result<ValidationReport, ValidateError> {
        let model = M::describe();
        let aggregator = self.aggregator(Mode::Sync, None);
        let failures = aggregator
            .validate_model(instance, MemberPath::root(), only)
            .now_or_never()
            .unwrap_or(Err(ValidateError::AsyncRequired {
                model: model.name(),
                member: only.unwrap_or(""),
            }))?;
        Ok(self.finish(model.name(), failures))
    }

    fn aggregator<'v>(&'v self, mode: Mode, cancel: Option<&'v CancellationToken>) -> Aggregator<'v> {
        Aggregator {
            registry: &self.registry,
            messages: &self.messages,
            mode,
            cancel,
        }
    }

    fn finish(&self, model: &'static str, mut failures: Vec<Failure>) -> ValidationReport {
        if self.options.deduplicate {
            let mut seen = HashSet::new();
            failures.retain(|failure| seen.insert((failure.path.clone(), failure.rule_id)));
        }
        debug!(model, failures = failures.len(), "validation finished");
        ValidationReport::new(failures)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
