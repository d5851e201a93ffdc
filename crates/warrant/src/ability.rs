//! The query surface of a built rule set.
//!
//! An [`Ability`] is immutable once built and can be shared across threads.
//! Every query follows the same path:
//!
//! 1. Resolve the resource (and, for untyped queries, the action name).
//! 2. Validate the data against the resource schema. Invalid data is an
//!    error for every query form, so `cannot` is never a blind `!can`.
//! 3. Evaluate the resource's rules, last matching rule first.
//! 4. Emit an audit event, if enabled.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AuthorizeError, EvaluationError, PermissionDenied};
use crate::evaluator::{self, Decision, Subject};
use crate::registry::{ResourceEntry, ResourceTable};
use crate::resource::{Action, Resource, ResourceType};
use crate::rules::{Effect, Rule, RuleId, RuleStore};
use crate::schema::ValidationError;

// ============================================================================
// Query
// ============================================================================

/// An untyped query, for callers that only know names at runtime.
///
/// `data: None` asks about the resource type rather than an instance.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub resource: &'a str,
    pub action: &'a str,
    pub data: Option<&'a Value>,
}

impl<'a> Query<'a> {
    pub fn new(resource: &'a str, action: &'a str) -> Self {
        Self {
            resource,
            action,
            data: None,
        }
    }

    pub fn with_data(mut self, data: &'a Value) -> Self {
        self.data = Some(data);
        self
    }
}

// ============================================================================
// Ability
// ============================================================================

/// The complete rule set built for one context.
pub struct Ability {
    table: Arc<ResourceTable>,
    rules: RuleStore,
}

impl Ability {
    pub(crate) fn new(table: Arc<ResourceTable>, rules: RuleStore) -> Self {
        Self { table, rules }
    }

    // ------------------------------------------------------------------------
    // Typed queries
    // ------------------------------------------------------------------------

    /// Evaluates `action` on one instance of `R`.
    pub fn decide<R: Resource>(
        &self,
        action: R::Action,
        data: &R::Data,
    ) -> Result<Decision, EvaluationError> {
        let entry = self.table.entry(R::NAME)?;
        let data = to_json(entry, data)?;
        self.decide_checked(entry, entry.action(action.name())?, Some(&data))
    }

    /// True iff `action` is allowed on `data`.
    pub fn can<R: Resource>(
        &self,
        action: R::Action,
        data: &R::Data,
    ) -> Result<bool, EvaluationError> {
        self.decide::<R>(action, data).map(|decision| decision.is_allowed())
    }

    /// True iff `action` is denied on `data`. Errors exactly when `can` does.
    pub fn cannot<R: Resource>(
        &self,
        action: R::Action,
        data: &R::Data,
    ) -> Result<bool, EvaluationError> {
        self.can::<R>(action, data).map(|allowed| !allowed)
    }

    /// Succeeds iff `action` is allowed; a denial carries the deciding rule's
    /// reason.
    pub fn authorize<R: Resource>(
        &self,
        action: R::Action,
        data: &R::Data,
    ) -> Result<(), AuthorizeError> {
        let decision = self.decide::<R>(action, data)?;
        into_authorization(R::resource_type(), action.name(), decision)
    }

    /// Every action of `R` allowed on `data`, in `R::Action::ALL` order.
    pub fn permitted_actions<R: Resource>(
        &self,
        data: &R::Data,
    ) -> Result<Vec<R::Action>, EvaluationError> {
        let entry = self.table.entry(R::NAME)?;
        let data = to_json(entry, data)?;
        validate(entry, Some(&data))?;

        let subject = Subject::new(entry.resource, &data);
        Ok(R::Action::ALL
            .iter()
            .copied()
            .filter(|action| {
                let decision =
                    evaluator::evaluate(self.rules.rules_for(R::NAME), action.name(), &subject);
                self.audit(&subject, action.name(), &decision);
                decision.is_allowed()
            })
            .collect())
    }

    // ------------------------------------------------------------------------
    // Untyped queries
    // ------------------------------------------------------------------------

    /// Evaluates an untyped query.
    ///
    /// # Errors
    ///
    /// - unknown resource or action names
    /// - data rejected by the resource schema (type-level queries validate
    ///   `null`)
    pub fn decide_query(&self, query: &Query<'_>) -> Result<Decision, EvaluationError> {
        let entry = self.table.entry(query.resource)?;
        let action = entry.action(query.action)?;
        self.decide_checked(entry, action, query.data)
    }

    pub fn can_query(&self, query: &Query<'_>) -> Result<bool, EvaluationError> {
        self.decide_query(query).map(|decision| decision.is_allowed())
    }

    pub fn cannot_query(&self, query: &Query<'_>) -> Result<bool, EvaluationError> {
        self.can_query(query).map(|allowed| !allowed)
    }

    pub fn authorize_query(&self, query: &Query<'_>) -> Result<(), AuthorizeError> {
        let entry = self.table.entry(query.resource).map_err(EvaluationError::from)?;
        let action = entry.action(query.action).map_err(EvaluationError::from)?;
        let decision = self.decide_checked(entry, action, query.data)?;
        into_authorization(entry.resource, action, decision)
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Every rule, in declaration order.
    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Rules of one resource, in declaration order.
    pub fn rules_for<'s>(
        &'s self,
        resource: &str,
    ) -> impl DoubleEndedIterator<Item = &'s Rule> + use<'s> {
        self.rules.rules_for(resource)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn decide_checked(
        &self,
        entry: &ResourceEntry,
        action: &'static str,
        data: Option<&Value>,
    ) -> Result<Decision, EvaluationError> {
        validate(entry, data)?;

        let subject = Subject {
            resource: entry.resource,
            data,
        };
        let decision = evaluator::evaluate(
            self.rules.rules_for(entry.resource.as_str()),
            action,
            &subject,
        );
        self.audit(&subject, action, &decision);
        Ok(decision)
    }

    fn audit(&self, subject: &Subject<'_>, action: &str, decision: &Decision) {
        let audit = &self.table.config.audit;
        if !audit.enabled {
            return;
        }

        match decision.effect {
            Effect::Allow if audit.log_allowed => info!(
                resource = %subject.resource,
                action,
                rule = ?decision.matched_rule,
                type_level = subject.data.is_none(),
                "Access granted"
            ),
            Effect::Allow => {}
            Effect::Deny => warn!(
                resource = %subject.resource,
                action,
                rule = ?decision.matched_rule,
                reason = decision.reason.as_deref().unwrap_or(""),
                type_level = subject.data.is_none(),
                "Access denied"
            ),
        }
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("table", &self.table)
            .field("rules", &self.rules)
            .finish()
    }
}

fn validate(entry: &ResourceEntry, data: Option<&Value>) -> Result<(), EvaluationError> {
    entry
        .schema
        .validate(data.unwrap_or(&Value::Null))
        .map_err(|source| EvaluationError::InvalidData {
            resource: entry.resource,
            source,
        })
}

fn to_json<T: serde::Serialize>(entry: &ResourceEntry, data: &T) -> Result<Value, EvaluationError> {
    serde_json::to_value(data).map_err(|err| EvaluationError::InvalidData {
        resource: entry.resource,
        source: ValidationError::from(err),
    })
}

fn into_authorization(
    resource: ResourceType,
    action: &str,
    decision: Decision,
) -> Result<(), AuthorizeError> {
    if decision.is_allowed() {
        return Ok(());
    }
    Err(PermissionDenied {
        resource,
        action: action.to_string(),
        reason: decision.reason,
    }
    .into())
}

// ============================================================================
// Tests
// ============================================================================
