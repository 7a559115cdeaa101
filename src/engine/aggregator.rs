//! The evaluation algorithm shared by synchronous and asynchronous
//! validation.
//!
//! Evaluation is written once as an async walk over the model graph. The
//! synchronous front end runs it in [`Mode::Sync`], which rejects async
//! rules up front, so every future it creates is immediately ready and can
//! be driven with `now_or_never`.

use super::error::ValidateError;
use super::path::MemberPath;
use super::report::Failure;
use crate::core::{Children, CheckContext, Member, Model, Rule, RuleCheck, Target, Value};
use crate::message::MessageResolver;
use crate::registry::{RuleGroup, RuleRegistry};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Sync,
    Async,
}

pub(crate) struct Aggregator<'v> {
    pub(crate) registry: &'v RuleRegistry,
    pub(crate) messages: &'v MessageResolver,
    pub(crate) mode: Mode,
    pub(crate) cancel: Option<&'v CancellationToken>,
}

impl<'v> Aggregator<'v> {
    /// Validates `instance` and everything reachable through nested rules.
    ///
    /// The root type must be built. Nested types without any registry entry
    /// contribute nothing; nested types with an entry must be built too.
    /// `only` restricts the root level to a single member.
    pub(crate) fn validate_model<'a>(
        &'a self,
        instance: &'a mut dyn Model,
        path: MemberPath,
        only: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Vec<Failure>, ValidateError>> {
        async move {
            self.ensure_live()?;

            let model = instance.model_type();
            if !path.is_root() && !self.registry.contains(&model) {
                trace!(model = model.name(), path = %path, "no rules registered, skipping");
                return Ok(Vec::new());
            }

            let groups = self.registry.rules_for(&model)?;
            let mut failures = Vec::new();
            let mut descend: Vec<&'static str> = Vec::new();

            for group in &groups {
                if only.is_some_and(|name| name != group.member().name()) {
                    continue;
                }
                self.validate_group(&mut *instance, group, &path, &mut failures, &mut descend)
                    .await?;
            }

            for name in descend {
                self.ensure_live()?;
                let member_path = path.member(name);
                match instance.children_mut(name) {
                    Some(Children::One(child)) => {
                        failures.extend(self.validate_model(child, member_path, None).await?);
                    }
                    Some(Children::Many(children)) => {
                        for (index, child) in children.into_iter().enumerate() {
                            self.ensure_live()?;
                            let element_path = member_path.index(index);
                            failures.extend(self.validate_model(child, element_path, None).await?);
                        }
                    }
                    None => {}
                }
            }

            Ok(failures)
        }
        .boxed()
    }

    async fn validate_group(
        &self,
        instance: &mut dyn Model,
        group: &RuleGroup,
        path: &MemberPath,
        failures: &mut Vec<Failure>,
        descend: &mut Vec<&'static str>,
    ) -> Result<(), ValidateError> {
        let member = group.member();
        if self.mode == Mode::Sync && group.is_async() {
            return Err(ValidateError::AsyncRequired {
                model: member.owner().name(),
                member: member.name(),
            });
        }

        let live = self.applicable(&*instance, group.rules()).await?;
        if !live.iter().any(|holds| *holds) {
            trace!(member = %member, "no applicable rule, skipping member");
            return Ok(());
        }

        let mut value = instance.get(member.name()).unwrap_or_default();
        if let Some(transform) = group.transform() {
            let next = transform(&*instance, member, value.clone());
            value = if instance.set(member.name(), next.clone()) {
                instance.get(member.name()).unwrap_or(next)
            } else {
                next
            };
            trace!(member = %member, "applied pre-validation transform");
        }

        let member_path = path.member(member.name());
        for (rule, holds) in group.rules().iter().zip(live) {
            self.ensure_live()?;
            if !holds {
                continue;
            }
            trace!(member = %member, check = rule.check().kind(), "evaluating rule");

            if matches!(rule.check(), RuleCheck::Nested) {
                mark(descend, member.name());
                continue;
            }

            match rule.target() {
                Target::Member => {
                    self.run_check(rule, &*instance, &value, &member_path, failures)
                        .await?;
                }
                Target::Elements => {
                    let Some(items) = value.as_list() else {
                        continue;
                    };
                    if items.iter().any(|item| matches!(item, Value::Model(_))) {
                        mark(descend, member.name());
                    }
                    for (index, item) in items.iter().enumerate() {
                        let element_path = member_path.index(index);
                        self.run_check(rule, &*instance, item, &element_path, failures)
                            .await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Which rules apply to `instance`, in registration order. Markers never
    /// apply; they only record an empty conditional block.
    async fn applicable(
        &self,
        instance: &dyn Model,
        rules: &[Arc<Rule>],
    ) -> Result<Vec<bool>, ValidateError> {
        match self.mode {
            Mode::Sync => {
                let mut live = Vec::with_capacity(rules.len());
                for rule in rules {
                    let holds = !is_marker(rule) && rule.condition().evaluate(instance).await;
                    live.push(holds);
                }
                Ok(live)
            }
            Mode::Async => {
                let pending = rules.iter().map(|rule| async move {
                    !is_marker(rule) && rule.condition().evaluate(instance).await
                });
                let live = join_all(pending).await;
                self.ensure_live()?;
                Ok(live)
            }
        }
    }

    async fn run_check(
        &self,
        rule: &Rule,
        instance: &dyn Model,
        value: &Value,
        path: &MemberPath,
        failures: &mut Vec<Failure>,
    ) -> Result<(), ValidateError> {
        let member = rule.member();
        let kind = rule.check().kind();

        let outcome = match rule.check() {
            RuleCheck::Value(check) => {
                let context = CheckContext { instance, member };
                check.validate(value, &context)
            }
            RuleCheck::Async(check) => check.run(value.clone()).await,
            RuleCheck::Nested | RuleCheck::Marker => Ok(true),
        };

        let passed = outcome.map_err(|source| ValidateError::Check {
            path: path.to_string(),
            kind,
            source,
        })?;

        if !passed {
            failures.push(self.failure(rule, member, value, path));
        }
        Ok(())
    }

    fn failure(&self, rule: &Rule, member: &Member, value: &Value, path: &MemberPath) -> Failure {
        let display_name = rule.display_name().unwrap_or(member.name()).to_string();
        Failure {
            path: path.clone(),
            member: member.name(),
            message: self.messages.resolve(rule, &display_name),
            display_name,
            attempted_value: value.clone(),
            key: rule.key().map(str::to_string),
            rule_id: rule.id(),
            check_kind: rule.check().kind(),
        }
    }

    fn ensure_live(&self) -> Result<(), ValidateError> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(ValidateError::Cancelled),
            _ => Ok(()),
        }
    }
}

fn is_marker(rule: &Rule) -> bool {
    matches!(rule.check(), RuleCheck::Marker)
}

fn mark(descend: &mut Vec<&'static str>, member: &'static str) {
    if !descend.contains(&member) {
        descend.push(member);
    }
}
