//! # warrant: Attribute-Based Access Control
//!
//! Decides whether an actor may perform an action on a resource, given the
//! resource's data. Rules are declared per resource type by application code
//! that sees the full request context (the current user, their memberships,
//! feature flags) and are then frozen into an [`Ability`] for that context.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Registry<C>                                 │
//! │  ├─ Resource: name, action set, data schema  │
//! │  └─ Declaration logic: (&mut Rules, &C)      │
//! └─────────────────┬───────────────────────────┘
//!                   │ ability(&context)
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Ability                                     │
//! │  ├─ Validate data against the schema         │
//! │  ├─ Scan the resource's rules, last first    │
//! │  └─ Match conditions against the data        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Decision                                    │
//! │  - Effect (Allow/Deny, Deny if no match)     │
//! │  - Matched rule id                           │
//! │  - Reason of the deciding deny rule          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The last matching rule wins in both directions: a later deny overrides an
//! earlier grant and a later grant overrides an earlier deny.
//!
//! ## Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use warrant::{Action, Condition, Registry, Resource};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum WorkspaceAction {
//!     Read,
//!     Update,
//! }
//!
//! impl Action for WorkspaceAction {
//!     const ALL: &'static [Self] = &[Self::Read, Self::Update];
//!
//!     fn name(self) -> &'static str {
//!         match self {
//!             Self::Read => "read",
//!             Self::Update => "update",
//!         }
//!     }
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct WorkspaceData {
//!     #[serde(rename = "createdBy")]
//!     created_by: String,
//! }
//!
//! struct Workspace;
//!
//! impl Resource for Workspace {
//!     const NAME: &'static str = "workspace";
//!     type Action = WorkspaceAction;
//!     type Data = WorkspaceData;
//! }
//!
//! struct User {
//!     id: String,
//! }
//!
//! let registry = Registry::<User>::builder()
//!     .resource::<Workspace>(|rules, user| {
//!         rules.grant(WorkspaceAction::Read);
//!         rules.grant_when(WorkspaceAction::Update, Condition::eq("createdBy", user.id.as_str()));
//!         rules
//!             .deny_when(WorkspaceAction::Update, Condition::is_in("createdBy", ["steve"]))
//!             .because("because steve");
//!         Ok(())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let ability = registry.ability(&User { id: "james".into() }).unwrap();
//! let theirs = WorkspaceData { created_by: "james".into() };
//! let others = WorkspaceData { created_by: "david".into() };
//!
//! assert!(ability.can::<Workspace>(WorkspaceAction::Update, &theirs).unwrap());
//! assert!(ability.cannot::<Workspace>(WorkspaceAction::Update, &others).unwrap());
//! ```

pub mod ability;
pub mod condition;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod resource;
pub mod rules;
pub mod schema;

// Kani proofs for bounded model checking
#[cfg(any(test, kani))]
mod kani_proofs;


pub use ability::{Ability, Query};
pub use condition::{Condition, MatcherError, Predicate, matches};
pub use config::{AuditConfig, ConfigError, EngineConfig};
pub use error::{
    AuthorizeError, ConfigurationError, DeclarationError, EvaluationError, PermissionDenied,
};
pub use evaluator::{Decision, Subject, evaluate};
pub use registry::{Registry, RegistryBuilder, RuleRef, Rules};
pub use resource::{Action, ActionList, Resource, ResourceType};
pub use rules::{Effect, Rule, RuleId, RuleStore};
pub use schema::{Schema, TypedSchema, ValidationError};
