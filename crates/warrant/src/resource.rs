//! Resource and action typing.
//!
//! A protected entity class is described once by implementing [`Resource`]:
//! its registered name, the enumerated set of actions that apply to it, and
//! the Rust type of its data. Rules are scoped to a single resource type, so
//! `Read` on a workspace and `Read` on a project never collide.

use std::fmt::{self, Debug, Display};

use serde::Serialize;
use serde::de::DeserializeOwned;

// ============================================================================
// Resource Type
// ============================================================================

/// Identifier naming a class of protected entities (e.g. `"workspace"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceType(&'static str);

impl ResourceType {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl PartialEq<str> for ResourceType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ResourceType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// Action
// ============================================================================

/// A resource-scoped enumerated action set.
///
/// ```
/// use warrant::Action;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum DocumentAction {
///     Read,
///     Archive,
/// }
///
/// impl Action for DocumentAction {
///     const ALL: &'static [Self] = &[Self::Read, Self::Archive];
///
///     fn name(self) -> &'static str {
///         match self {
///             Self::Read => "read",
///             Self::Archive => "archive",
///         }
///     }
/// }
///
/// assert_eq!(DocumentAction::parse("archive"), Some(DocumentAction::Archive));
/// ```
pub trait Action: Copy + Eq + Debug + Send + Sync + 'static {
    /// Every member of the action set.
    const ALL: &'static [Self];

    /// Stable name used in rules, untyped queries, and audit events.
    fn name(self) -> &'static str;

    /// Looks up an action by its stable name.
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| action.name() == name)
    }
}

// ============================================================================
// Resource
// ============================================================================

/// A class of protected entities: its name, action set, and data type.
pub trait Resource: 'static {
    /// Registered resource name. Must be unique within a registry.
    const NAME: &'static str;

    /// Actions that can be performed on this resource.
    type Action: Action;

    /// Data describing one instance. Rules match against its JSON form.
    type Data: Serialize + DeserializeOwned + 'static;

    fn resource_type() -> ResourceType {
        ResourceType::new(Self::NAME)
    }
}

// ============================================================================
// Action List
// ============================================================================

/// One action or a set of actions named by a single `grant`/`deny` call.
///
/// A rule over several actions evaluates exactly like one rule per action
/// sharing the same condition and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList<A>(Vec<A>);

impl<A: Action> ActionList<A> {
    pub fn as_slice(&self) -> &[A] {
        &self.0
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::with_capacity(self.0.len());
        for action in &self.0 {
            let name = action.name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl<A: Action> From<A> for ActionList<A> {
    fn from(action: A) -> Self {
        Self(vec![action])
    }
}

impl<A: Action, const N: usize> From<[A; N]> for ActionList<A> {
    fn from(actions: [A; N]) -> Self {
        Self(actions.to_vec())
    }
}

impl<A: Action> From<Vec<A>> for ActionList<A> {
    fn from(actions: Vec<A>) -> Self {
        Self(actions)
    }
}

impl<A: Action> From<&[A]> for ActionList<A> {
    fn from(actions: &[A]) -> Self {
        Self(actions.to_vec())
    }
}

// ============================================================================
// Tests
// ============================================================================
