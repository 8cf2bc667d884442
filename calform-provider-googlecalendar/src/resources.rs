//! Resource type definitions for Google Calendar
//!
//! Maps host resource type names onto the schema configs in [`crate::schemas`].

use calform_core::provider::ResourceType;
use calform_core::schema::ResourceSchema;

use crate::schemas::GoogleCalendarSchemaConfig;

/// Calendar every resource lives in
pub const CALENDAR_ID: &str = "primary";

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $config:path) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $config().schema
            }
        }
    };
}

define_resource_type!(EventType, "event", crate::schemas::event::event_config);

/// Returns all resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(EventType)]
}

/// Schema config for a host resource type name
pub fn schema_config(resource_type: &str) -> Option<GoogleCalendarSchemaConfig> {
    crate::schemas::configs()
        .into_iter()
        .find(|c| c.resource_type_name == resource_type)
}
