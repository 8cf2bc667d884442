//! Google Calendar Provider implementation
//!
//! This module contains the main provider implementation that communicates
//! with the Calendar API to manage events.

use std::sync::Arc;

use calform_core::provider::{ProviderError, ProviderResult};
use calform_core::resource::{Resource, ResourceId, State};
use log::{debug, info};

use crate::api::Event;
use crate::auth::{Credentials, TokenSource};
use crate::client::{CalendarClient, MutationOptions};
use crate::config::ProviderConfig;
use crate::error::ClientError;
use crate::event::{build_event, read_event};
use crate::model::EventModel;
use crate::resources::{CALENDAR_ID, schema_config};
use crate::schemas::GoogleCalendarSchemaConfig;

/// Google Calendar Provider
#[derive(Debug, Clone)]
pub struct GoogleCalendarProvider {
    client: Arc<CalendarClient>,
    calendar_id: String,
}

impl GoogleCalendarProvider {
    /// Build an authenticated provider from its configuration
    ///
    /// Fails if no credentials can be found or they cannot be used. Tokens are
    /// fetched on first use.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let resolved = config.resolve_credentials().map_err(configuration_error)?;
        debug!("using credentials from {}", resolved.source);
        let credentials = Credentials::from_json(&resolved.json).map_err(configuration_error)?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| configuration_error(ClientError::Transport(e)))?;
        let tokens =
            TokenSource::from_credentials(credentials, http.clone()).map_err(configuration_error)?;

        Ok(Self::with_client(Arc::new(CalendarClient::new(http, tokens))))
    }

    /// Provider around an existing client
    pub fn with_client(client: Arc<CalendarClient>) -> Self {
        Self {
            client,
            calendar_id: CALENDAR_ID.to_string(),
        }
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Create an event and return its state from the insert response
    pub async fn create_resource(&self, resource: Resource) -> ProviderResult<State> {
        let model = self.desired_model(&resource)?;
        let event = build_event(&model, Event::default());

        let created = self
            .client
            .insert_event(
                &self.calendar_id,
                &event,
                MutationOptions::new(model.send_notifications),
            )
            .await
            .map_err(|e| remote_error("create", None, e).for_resource(resource.id.clone()))?;

        let identifier = created.id.clone().ok_or_else(|| {
            ProviderError::remote("Created event has no id").for_resource(resource.id.clone())
        })?;
        info!("created event {} for {}", identifier, resource.id.name);

        let model = read_event(&model, &created);
        Ok(State::existing(resource.id, model.to_attributes()).with_identifier(identifier))
    }

    /// Refresh an event from the remote service
    ///
    /// A missing event is reported as an error like any other failure.
    pub async fn read_resource(&self, current: &State) -> ProviderResult<State> {
        let id = current.id.clone();
        self.check_resource_type(&id)?;

        let Some(identifier) = current.identifier.as_deref() else {
            return Ok(State::not_found(id));
        };

        let prior = EventModel::from_attributes(&current.attributes)
            .map_err(|e| e.for_resource(id.clone()))?;
        let event = self
            .client
            .get_event(&self.calendar_id, identifier)
            .await
            .map_err(|e| remote_error("read", Some(identifier), e).for_resource(id.clone()))?;

        let model = read_event(&prior, &event);
        Ok(State::existing(id, model.to_attributes()).with_identifier(identifier))
    }

    /// Update an event in place
    ///
    /// The current remote event is fetched first so fields not modelled
    /// here, and remote-managed attendee fields, are written back unchanged.
    pub async fn update_resource(&self, from: &State, to: Resource) -> ProviderResult<State> {
        let identifier = require_identifier(from)?;
        let model = self.desired_model(&to)?;

        let remote = self
            .client
            .get_event(&self.calendar_id, identifier)
            .await
            .map_err(|e| remote_error("read", Some(identifier), e).for_resource(to.id.clone()))?;

        let event = build_event(&model, remote);
        let updated = self
            .client
            .update_event(
                &self.calendar_id,
                identifier,
                &event,
                MutationOptions::new(model.send_notifications),
            )
            .await
            .map_err(|e| remote_error("update", Some(identifier), e).for_resource(to.id.clone()))?;
        info!("updated event {} for {}", identifier, to.id.name);

        let model = read_event(&model, &updated);
        Ok(State::existing(to.id, model.to_attributes()).with_identifier(identifier))
    }

    /// Delete an event, notifying attendees per the prior state
    pub async fn delete_resource(&self, current: &State) -> ProviderResult<()> {
        let identifier = require_identifier(current)?;
        self.check_resource_type(&current.id)?;

        let send_notifications = current
            .attributes
            .get("send_notifications")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);

        self.client
            .delete_event(&self.calendar_id, identifier, send_notifications)
            .await
            .map_err(|e| {
                remote_error("delete", Some(identifier), e).for_resource(current.id.clone())
            })?;
        info!("deleted event {} for {}", identifier, current.id.name);
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn check_resource_type(&self, id: &ResourceId) -> ProviderResult<GoogleCalendarSchemaConfig> {
        schema_config(&id.resource_type).ok_or_else(|| {
            ProviderError::new(format!("Unknown resource type: {}", id.resource_type))
                .for_resource(id.clone())
        })
    }

    /// Validate a desired configuration and fill in defaults
    fn desired_model(&self, resource: &Resource) -> ProviderResult<EventModel> {
        let config = self.check_resource_type(&resource.id)?;

        config
            .schema
            .validate(&resource.attributes)
            .map_err(|errors| {
                ProviderError::from_type_errors(&errors).for_resource(resource.id.clone())
            })?;

        let mut attributes = resource.attributes.clone();
        config.schema.apply_defaults(&mut attributes);
        EventModel::from_attributes(&attributes).map_err(|e| e.for_resource(resource.id.clone()))
    }
}

fn require_identifier(state: &State) -> ProviderResult<&str> {
    state.identifier.as_deref().ok_or_else(|| {
        ProviderError::new("Event has no identifier").for_resource(state.id.clone())
    })
}

fn configuration_error(err: ClientError) -> ProviderError {
    ProviderError::configuration(err.to_string()).with_cause(err)
}

fn remote_error(verb: &str, identifier: Option<&str>, err: ClientError) -> ProviderError {
    let message = match identifier {
        Some(identifier) => format!("Could not {} event {}: {}", verb, identifier, err),
        None => format!("Could not {} event: {}", verb, err),
    };
    ProviderError::remote(message).with_cause(err)
}
