//! Provider - Trait abstracting resource operations
//!
//! A Provider defines operations for a specific remote service (Google Calendar, ...).
//! It is responsible for converting lifecycle requests into actual API calls.
//! A ProviderFactory turns provider-level configuration into a configured Provider.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State, Value};
use crate::schema::{ResourceSchema, TypeError};

/// Category of a provider error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// Credentials or client construction failed; the provider is unusable
    Configuration,
    /// Configuration values rejected before any remote call
    Validation,
    /// The remote service returned an error or could not be reached
    Remote,
    /// Anything else (broken invariants, undecodable state)
    Internal,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Remote => "remote",
            Self::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    /// Internal error
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(ProviderErrorKind::Internal, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::with_kind(ProviderErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_kind(ProviderErrorKind::Validation, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::with_kind(ProviderErrorKind::Remote, message)
    }

    /// Validation error summarising schema type errors
    pub fn from_type_errors(errors: &[TypeError]) -> Self {
        let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        Self::validation(format!("Invalid configuration: {}", details.join("; ")))
    }

    fn with_kind(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "event")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;
}

/// Main Provider trait
///
/// A configured provider. All operations are async and involve side effects.
/// Each operation either fully succeeds and returns the new state, or fails
/// and leaves the caller's state untouched.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "googlecalendar")
    fn name(&self) -> &'static str;

    /// List of resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the remote identifier
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Refresh a resource from the remote service
    ///
    /// `current` carries the remote identifier and the prior attributes.
    /// Returns `State::not_found()` if `current` has no identifier.
    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place; the identifier never changes
    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(current)
    }

    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(from, to)
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(current)
    }
}

/// Provider-level configuration handed over by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigureRequest {
    /// Attributes of the provider configuration block
    pub attributes: HashMap<String, Value>,
    /// Version of the host runtime, if it reported one
    pub host_version: Option<String>,
}

impl ConfigureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_host_version(mut self, version: impl Into<String>) -> Self {
        self.host_version = Some(version.into());
        self
    }
}

/// Entry point the host uses to obtain a configured Provider
pub trait ProviderFactory: Send + Sync {
    /// Name of the Provider this factory configures
    fn name(&self) -> &'static str;

    /// Schema of the provider configuration block
    fn config_schema(&self) -> ResourceSchema;

    /// Build a configured Provider, or fail with a configuration error
    fn configure(
        &self,
        request: ConfigureRequest,
    ) -> BoxFuture<'_, ProviderResult<Box<dyn Provider>>>;
}
