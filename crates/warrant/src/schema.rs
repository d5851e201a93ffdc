//! Per-resource data validation.
//!
//! The engine never evaluates rules against data that the resource's schema
//! rejects. Schemas are supplied by the embedding application; the default
//! for a registered [`Resource`](crate::Resource) is [`TypedSchema`], which
//! accepts exactly the JSON that deserializes into the resource's data type.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Data rejected by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable description of the failure.
    pub message: String,
    /// Field path the failure refers to, when known.
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Attaches the offending field path.
    pub fn at(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Validation capability for one resource type.
pub trait Schema: Send + Sync {
    fn validate(&self, data: &Value) -> Result<(), ValidationError>;
}

impl<F> Schema for F
where
    F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, data: &Value) -> Result<(), ValidationError> {
        self(data)
    }
}

/// Accepts data that deserializes into `T`.
pub struct TypedSchema<T>(PhantomData<fn() -> T>);

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedSchema")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> Schema for TypedSchema<T> {
    fn validate(&self, data: &Value) -> Result<(), ValidationError> {
        T::deserialize(data).map(drop).map_err(ValidationError::from)
    }
}
