//! Rule evaluation.
//!
//! Rules are scanned from the most recently declared to the first. The first
//! rule met on that walk whose actions include the requested action and
//! whose condition matches the data decides the outcome, so the last
//! matching declaration wins in either direction (a later deny overrides an
//! earlier grant, and a later grant overrides an earlier deny). If nothing
//! matches, access is denied with no reason.

use serde_json::Value;

use crate::condition;
use crate::resource::ResourceType;
use crate::rules::{Effect, Rule, RuleId};

// ============================================================================
// Subject
// ============================================================================

/// Data paired with the resource type it belongs to.
///
/// `data` is `None` for type-level checks ("may this context read
/// workspaces at all?").
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub resource: ResourceType,
    pub data: Option<&'a Value>,
}

impl<'a> Subject<'a> {
    pub fn new(resource: ResourceType, data: &'a Value) -> Self {
        Self {
            resource,
            data: Some(data),
        }
    }

    pub fn of_type(resource: ResourceType) -> Self {
        Self {
            resource,
            data: None,
        }
    }
}

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Whether access is allowed or denied.
    pub effect: Effect,
    /// The rule that decided, or `None` if nothing matched.
    pub matched_rule: Option<RuleId>,
    /// Reason of the winning deny rule, if it supplied one.
    pub reason: Option<String>,
}

impl Decision {
    /// Deny-by-default outcome.
    pub fn no_match() -> Self {
        Self {
            effect: Effect::Deny,
            matched_rule: None,
            reason: None,
        }
    }

    fn from_rule(rule: &Rule) -> Self {
        let reason = match rule.effect {
            Effect::Deny => rule.reason.clone(),
            Effect::Allow => None,
        };
        Self {
            effect: rule.effect,
            matched_rule: Some(rule.id),
            reason,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect.is_allow()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Decides `action` on `subject` given a resource's rules in declaration
/// order.
///
/// # Postcondition
///
/// Always returns a `Decision`; matcher errors count as non-matches.
pub fn evaluate<'r, I>(rules: I, action: &str, subject: &Subject<'_>) -> Decision
where
    I: IntoIterator<Item = &'r Rule>,
    I::IntoIter: DoubleEndedIterator,
{
    rules
        .into_iter()
        .rev()
        .find(|rule| {
            rule.resource == subject.resource && rule.covers(action) && applies(rule, subject)
        })
        .map_or_else(Decision::no_match, Decision::from_rule)
}

/// Whether a rule's condition admits the subject.
///
/// Without data, only the rule's shape is known: unconditional rules apply,
/// conditional grants apply (some instance may satisfy them), and conditional
/// denials do not (some instance may escape them).
fn applies(rule: &Rule, subject: &Subject<'_>) -> bool {
    match subject.data {
        Some(data) => condition::matches(rule.condition.as_ref(), data),
        None => !rule.is_conditional() || rule.effect.is_allow(),
    }
}

// ============================================================================
// Tests
// ============================================================================
