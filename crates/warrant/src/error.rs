//! Error taxonomy.
//!
//! - [`ConfigurationError`]: registration or ability-build problems
//! - [`EvaluationError`]: a query could not be evaluated (bad configuration
//!   or data rejected by the resource schema)
//! - [`PermissionDenied`]: the decision was deny (only raised by `authorize`)

use std::fmt;

use thiserror::Error;

use crate::condition::MatcherError;
use crate::resource::ResourceType;
use crate::schema::ValidationError;

/// Error returned by declaration logic while an ability is being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A condition document could not be parsed.
    #[error("invalid condition: {0}")]
    InvalidCondition(#[from] MatcherError),

    /// The declaration logic refused to build rules for this context.
    #[error("{0}")]
    Rejected(String),
}

/// Registration or build-time misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A resource type was queried or declared without being registered.
    #[error("resource '{0}' is not registered")]
    UnknownResource(String),

    /// An untyped query named an action outside the resource's action set.
    #[error("resource '{resource}' has no action '{action}'")]
    UnknownAction {
        resource: ResourceType,
        action: String,
    },

    /// The same resource name was registered twice.
    #[error("resource '{0}' is registered more than once")]
    DuplicateResource(ResourceType),

    /// A resource was registered with no declaration logic.
    #[error("no declaration logic was defined for resource '{0}'")]
    MissingDeclaration(ResourceType),

    /// Declaration logic was attached to the same resource twice.
    #[error("declaration logic for resource '{0}' is defined more than once")]
    DuplicateDeclaration(ResourceType),

    /// Declaration logic failed while building an ability.
    #[error("declaring rules for resource '{resource}' failed: {source}")]
    DeclarationFailed {
        resource: ResourceType,
        #[source]
        source: DeclarationError,
    },

    /// The context handed to the builder was rejected by the context validator.
    #[error("invalid context: {0}")]
    InvalidContext(#[source] ValidationError),
}

/// A query that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The data failed the resource's schema. No rule was consulted.
    #[error("the data passed to the '{resource}' resource is invalid: {source}")]
    InvalidData {
        resource: ResourceType,
        #[source]
        source: ValidationError,
    },
}

/// A deny decision, surfaced as an error by `authorize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDenied {
    pub resource: ResourceType,
    pub action: String,
    /// Reason attached to the winning deny rule, if any.
    pub reason: Option<String>,
}

impl fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot execute \"{}\" on \"{}\"", self.action, self.resource)?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PermissionDenied {}

/// Error returned by the decide-or-fail query form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizeError {
    #[error(transparent)]
    Denied(#[from] PermissionDenied),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl AuthorizeError {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }
}
