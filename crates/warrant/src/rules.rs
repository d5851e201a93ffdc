//! Rule definitions and the append-only rule store.
//!
//! Rules are kept in declaration order, for all resource types, with a
//! per-resource index so the evaluator can walk one resource's rules from
//! last to first. Declaration order is significant: the last matching rule
//! decides.

use std::collections::HashMap;
use std::fmt::{self, Display};

use serde::Serialize;

use crate::condition::Condition;
use crate::resource::ResourceType;

// ============================================================================
// Effect
// ============================================================================

/// The effect of a rule: allow or deny access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Deny access. Also the outcome when no rule matches.
    #[default]
    Deny,
}

impl Effect {
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ============================================================================
// Rule
// ============================================================================

/// Position of a rule in global declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RuleId(usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single allow/deny statement scoped to a resource type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: RuleId,
    pub resource: ResourceType,
    pub effect: Effect,
    /// Action names this rule covers.
    pub actions: Vec<&'static str>,
    /// `None` matches every instance.
    pub condition: Option<Condition>,
    /// Explanation surfaced when this rule denies access.
    pub reason: Option<String>,
}

impl Rule {
    pub fn covers(&self, action: &str) -> bool {
        self.actions.iter().any(|a| *a == action)
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

// ============================================================================
// Rule Store
// ============================================================================

/// Ordered, append-only collection of rules.
///
/// Only the ability builder appends; a built `Ability` exposes the store
/// read-only. Nothing is deduplicated or merged, so fully shadowed rules are
/// still present.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    by_resource: HashMap<&'static str, Vec<usize>>,
}

impl RuleStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(
        &mut self,
        resource: ResourceType,
        effect: Effect,
        actions: Vec<&'static str>,
        condition: Option<Condition>,
    ) -> RuleId {
        let index = self.rules.len();
        self.rules.push(Rule {
            id: RuleId(index),
            resource,
            effect,
            actions,
            condition,
            reason: None,
        });
        self.by_resource
            .entry(resource.as_str())
            .or_default()
            .push(index);
        RuleId(index)
    }

    /// Attaches a reason to a rule while it is still being declared.
    pub(crate) fn set_reason(&mut self, id: RuleId, reason: String) {
        if let Some(rule) = self.rules.get_mut(id.0) {
            rule.reason = Some(reason);
        }
    }

    /// Rules of one resource type, in declaration order.
    pub fn rules_for<'s>(
        &'s self,
        resource: &str,
    ) -> impl DoubleEndedIterator<Item = &'s Rule> + ExactSizeIterator + use<'s> {
        let indices = self
            .by_resource
            .get(resource)
            .map_or(&[][..], Vec::as_slice);
        indices.iter().map(move |&i| &self.rules[i])
    }

    /// All rules, in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleStore {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
