//! Calform Google Calendar Provider
//!
//! Manages Google Calendar events through the Calendar API v3.
//!
//! ## Module Structure
//!
//! - `config` - Provider configuration and credential resolution
//! - `auth` - Credential parsing and OAuth2 access tokens
//! - `client` - Calendar REST client
//! - `api` - Remote event representation
//! - `model` - Typed event attributes
//! - `event` - Mapping between the typed model and the remote event
//! - `resources` - Resource type definitions
//! - `provider` - GoogleCalendarProvider implementation
//! - `schemas` - Resource and provider schemas
//! - `utils` - Helper functions for value conversion

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod model;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

// Re-export main types
pub use client::CalendarClient;
pub use config::ProviderConfig;
pub use error::ClientError;
pub use provider::GoogleCalendarProvider;
pub use utils::{bool_to_transparency, transparency_to_bool};

use calform_core::provider::{
    BoxFuture, ConfigureRequest, Provider, ProviderError, ProviderFactory, ProviderResult,
    ResourceType,
};
use calform_core::resource::{Resource, State};
use calform_core::schema::ResourceSchema;

use resources::resource_types;

pub const PROVIDER_NAME: &str = "googlecalendar";

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for GoogleCalendarProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(resource).await })
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let current = current.clone();
        Box::pin(async move { self.read_resource(&current).await })
    }

    fn update(&self, from: &State, to: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&from, to).await })
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        let current = current.clone();
        Box::pin(async move { self.delete_resource(&current).await })
    }
}

// =============================================================================
// Provider Factory
// =============================================================================

/// Configures [`GoogleCalendarProvider`] instances for the host
#[derive(Debug, Default, Clone, Copy)]
pub struct GoogleCalendarProviderFactory;

impl ProviderFactory for GoogleCalendarProviderFactory {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn config_schema(&self) -> ResourceSchema {
        schemas::provider_config_schema()
    }

    fn configure(
        &self,
        request: ConfigureRequest,
    ) -> BoxFuture<'_, ProviderResult<Box<dyn Provider>>> {
        Box::pin(async move {
            self.config_schema()
                .validate(&request.attributes)
                .map_err(|errors| ProviderError::from_type_errors(&errors))?;
            let config = ProviderConfig::from_request(&request)?;
            let provider = GoogleCalendarProvider::from_config(&config)?;
            Ok(Box::new(provider) as Box<dyn Provider>)
        })
    }
}
