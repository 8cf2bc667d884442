//! Google Calendar resource schema definitions

pub mod event;

use calform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Google Calendar schema configuration
///
/// Combines a ResourceSchema with Calendar API metadata.
pub struct GoogleCalendarSchemaConfig {
    /// Host-side resource type name (e.g., "event")
    pub resource_type_name: &'static str,
    /// The resource schema with attribute definitions
    pub schema: ResourceSchema,
}

/// Returns all Google Calendar schema configs
pub fn configs() -> Vec<GoogleCalendarSchemaConfig> {
    vec![event::event_config()]
}

/// Schema of the provider block
pub fn provider_config_schema() -> ResourceSchema {
    ResourceSchema::new("googlecalendar")
        .with_description("Google Calendar provider configuration.")
        .attribute(
            AttributeSchema::new("credentials", AttributeType::String).with_description(
                "Service account or authorized user credentials as JSON, or a path to a file containing them. \
                 Falls back to GOOGLE_CREDENTIALS, GOOGLE_CLOUD_KEYFILE_JSON, GCLOUD_KEYFILE_JSON, \
                 GOOGLE_APPLICATION_CREDENTIALS and the gcloud application default credentials.",
            ),
        )
}
