//! Property-based tests using proptest.
//!
//! Checks rule precedence against a reference model: the decision is the
//! effect of the last declared rule that covers the action and matches the
//! data, or deny when there is none.

use proptest::prelude::*;
use serde_json::{Value, json};

use crate::evaluator::{Subject, evaluate};
use crate::rules::{Effect, RuleStore};
use crate::{Action, Condition, Registry, Resource, ResourceType};

const DOC: ResourceType = ResourceType::new("doc");
const ACTIONS: [&str; 3] = ["read", "write", "share"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocAction {
    Read,
    Write,
    Share,
}

impl Action for DocAction {
    const ALL: &'static [Self] = &[Self::Read, Self::Write, Self::Share];

    fn name(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Share => "share",
        }
    }
}

struct Doc;

impl Resource for Doc {
    const NAME: &'static str = "doc";
    type Action = DocAction;
    type Data = Value;
}

/// A generated rule: effect, covered action, and an optional `level == n`
/// condition.
#[derive(Debug, Clone)]
struct RuleSpec {
    allow: bool,
    action: usize,
    level: Option<u8>,
}

impl RuleSpec {
    fn effect(&self) -> Effect {
        if self.allow { Effect::Allow } else { Effect::Deny }
    }

    fn condition(&self) -> Option<Condition> {
        self.level.map(|level| Condition::eq("level", level))
    }

    fn matches(&self, action: usize, level: u8) -> bool {
        self.action == action && self.level.is_none_or(|expected| expected == level)
    }
}

fn rule_spec() -> impl Strategy<Value = RuleSpec> {
    (any::<bool>(), 0..ACTIONS.len(), prop::option::of(0u8..3)).prop_map(
        |(allow, action, level)| RuleSpec {
            allow,
            action,
            level,
        },
    )
}

fn store_of(specs: &[RuleSpec]) -> RuleStore {
    let mut store = RuleStore::new();
    for spec in specs {
        let actions = vec![ACTIONS[spec.action]];
        store.push(DOC, spec.effect(), actions, spec.condition());
    }
    store
}

fn expected(specs: &[RuleSpec], action: usize, level: u8) -> Effect {
    specs
        .iter()
        .rev()
        .find(|spec| spec.matches(action, level))
        .map_or(Effect::Deny, RuleSpec::effect)
}

fn registry_of(specs: &[RuleSpec]) -> Registry<()> {
    let declared = specs.to_vec();
    Registry::<()>::builder()
        .without_audit()
        .resource::<Doc>(move |rules, ()| {
            for spec in &declared {
                let action = DocAction::ALL[spec.action];
                match (spec.allow, spec.condition()) {
                    (true, None) => rules.grant(action),
                    (true, Some(condition)) => rules.grant_when(action, condition),
                    (false, None) => rules.deny(action),
                    (false, Some(condition)) => rules.deny_when(action, condition),
                };
            }
            Ok(())
        })
        .build()
        .unwrap()
}

proptest! {
    // ========================================================================
    // Precedence
    // ========================================================================

    /// The last matching rule decides, in either direction
    #[test]
    fn last_matching_rule_decides(
        specs in prop::collection::vec(rule_spec(), 0..12),
        action in 0..ACTIONS.len(),
        level in 0u8..3,
    ) {
        let store = store_of(&specs);
        let data = json!({"level": level});
        let subject = Subject::new(DOC, &data);
        let decision = evaluate(store.rules_for("doc"), ACTIONS[action], &subject);

        prop_assert_eq!(decision.effect, expected(&specs, action, level));
    }

    /// No matching rule means deny with nothing to report
    #[test]
    fn unmatched_queries_deny_without_reason(
        specs in prop::collection::vec(rule_spec(), 0..12),
        action in 0..ACTIONS.len(),
        level in 0u8..3,
    ) {
        let store = store_of(&specs);
        let data = json!({"level": level});
        let subject = Subject::new(DOC, &data);
        let decision = evaluate(store.rules_for("doc"), ACTIONS[action], &subject);

        if decision.matched_rule.is_none() {
            prop_assert_eq!(decision.effect, Effect::Deny);
            prop_assert!(decision.reason.is_none());
            prop_assert!(specs.iter().all(|spec| !spec.matches(action, level)));
        }
    }

    /// A rule appended after the rest always wins when it matches
    #[test]
    fn appended_unconditional_rule_wins(
        specs in prop::collection::vec(rule_spec(), 0..12),
        action in 0..ACTIONS.len(),
        allow: bool,
    ) {
        let mut store = store_of(&specs);
        let effect = if allow { Effect::Allow } else { Effect::Deny };
        let last = store.push(DOC, effect, vec![ACTIONS[action]], None);

        let data = json!({"level": 0});
        let subject = Subject::new(DOC, &data);
        let decision = evaluate(store.rules_for("doc"), ACTIONS[action], &subject);

        prop_assert_eq!(decision.effect, effect);
        prop_assert_eq!(decision.matched_rule, Some(last));
    }

    // ========================================================================
    // Ability Queries
    // ========================================================================

    /// `cannot` is the negation of `can`, and rebuilding gives the same answers
    #[test]
    fn cannot_negates_can_and_builds_are_idempotent(
        specs in prop::collection::vec(rule_spec(), 0..8),
        level in 0u8..3,
    ) {
        let registry = registry_of(&specs);

        let first = registry.ability(&()).unwrap();
        let second = registry.ability(&()).unwrap();
        let data = json!({"level": level});

        for (index, action) in DocAction::ALL.iter().enumerate() {
            let can = first.can::<Doc>(*action, &data).unwrap();
            prop_assert_eq!(first.cannot::<Doc>(*action, &data).unwrap(), !can);
            prop_assert_eq!(second.can::<Doc>(*action, &data).unwrap(), can);
            prop_assert_eq!(can, expected(&specs, index, level).is_allow());
        }
    }

    /// Asking one ability the same question again never changes the answer
    #[test]
    fn repeated_queries_on_one_ability_agree(
        specs in prop::collection::vec(rule_spec(), 0..8),
        queries in prop::collection::vec((0..ACTIONS.len(), 0u8..3), 1..16),
    ) {
        let registry = registry_of(&specs);
        let ability = registry.ability(&()).unwrap();

        let answers: Vec<bool> = queries
            .iter()
            .map(|&(action, level)| {
                let data = json!({"level": level});
                ability.can::<Doc>(DocAction::ALL[action], &data).unwrap()
            })
            .collect();

        for (&(action, level), &first) in queries.iter().zip(&answers).rev() {
            let data = json!({"level": level});
            let action = DocAction::ALL[action];
            prop_assert_eq!(ability.can::<Doc>(action, &data).unwrap(), first);
            prop_assert_eq!(ability.can::<Doc>(action, &data).unwrap(), first);
            prop_assert_eq!(ability.cannot::<Doc>(action, &data).unwrap(), !first);
        }
    }
}
