//! Kani proofs for rule evaluation
//!
//! These proofs verify the precedence and fail-safe properties of the
//! evaluator using bounded model checking.
//!
//! **Proof Count**: 4 proofs
//!
//! Run with: `cargo kani --tests --harness verify_*`

#[cfg(kani)]
use crate::evaluator::{self, Subject};
#[cfg(kani)]
use crate::resource::ResourceType;
#[cfg(kani)]
use crate::rules::{Effect, RuleStore};
#[cfg(kani)]
use serde_json::Value;

#[cfg(kani)]
const DOC: ResourceType = ResourceType::new("doc");

#[cfg(kani)]
fn any_effect() -> Effect {
    if kani::any() { Effect::Allow } else { Effect::Deny }
}

/// Proof #1: Evaluation determinism
///
/// **Property**: Same rules and query always produce the same decision
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_evaluation_determinism() {
    let mut store = RuleStore::new();
    store.push(DOC, any_effect(), vec!["read"], None);
    store.push(DOC, any_effect(), vec!["read"], None);

    let subject = Subject::of_type(DOC);
    let first = evaluator::evaluate(store.rules_for("doc"), "read", &subject);
    let second = evaluator::evaluate(store.rules_for("doc"), "read", &subject);

    assert_eq!(first, second);
}

/// Proof #2: Last matching rule wins
///
/// **Property**: For two unconditional rules on the same action, the
/// decision always carries the second rule's effect
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_last_match_wins() {
    let earlier = any_effect();
    let later = any_effect();

    let mut store = RuleStore::new();
    store.push(DOC, earlier, vec!["read"], None);
    let last = store.push(DOC, later, vec!["read"], None);

    let subject = Subject::of_type(DOC);
    let decision = evaluator::evaluate(store.rules_for("doc"), "read", &subject);

    assert_eq!(decision.effect, later);
    assert_eq!(decision.matched_rule, Some(last));
}

/// Proof #3: Deny by default
///
/// **Property**: An action no rule covers is denied with no matched rule
/// and no reason
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_default_deny_safety() {
    let mut store = RuleStore::new();
    store.push(DOC, any_effect(), vec!["read"], None);

    let data = Value::Null;
    let subject = Subject::new(DOC, &data);
    let decision = evaluator::evaluate(store.rules_for("doc"), "delete", &subject);

    assert_eq!(decision.effect, Effect::Deny);
    assert!(decision.matched_rule.is_none());
    assert!(decision.reason.is_none());
}

/// Proof #4: Foreign rules are inert
///
/// **Property**: Rules scoped to another resource never decide
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(4)]
fn verify_foreign_rules_inert() {
    let mut store = RuleStore::new();
    store.push(ResourceType::new("sheet"), any_effect(), vec!["read"], None);

    let decision = evaluator::evaluate(store.iter(), "read", &Subject::of_type(DOC));

    assert!(decision.matched_rule.is_none());
    assert!(!decision.is_allowed());
}
