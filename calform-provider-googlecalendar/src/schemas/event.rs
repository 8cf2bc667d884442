//! event schema definition for Google Calendar

use super::GoogleCalendarSchemaConfig;
use calform_core::resource::Value;
use calform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

/// Allowed visibility values; empty means the calendar default
pub const VISIBILITY_VALUES: &[&str] = &["public", "private", ""];

fn visibility_type() -> AttributeType {
    AttributeType::Enum(VISIBILITY_VALUES.iter().map(|v| v.to_string()).collect())
}

fn attendee_type() -> AttributeType {
    AttributeType::Struct {
        name: "Attendee".to_string(),
        fields: vec![
            AttributeSchema::new("email", AttributeType::String)
                .required()
                .with_description("Email address of the attendee."),
            AttributeSchema::new("optional", AttributeType::Bool)
                .computed()
                .with_default(Value::Bool(false))
                .with_description("Whether this is an optional attendee."),
        ],
    }
}

fn attachment_type() -> AttributeType {
    AttributeType::Struct {
        name: "Attachment".to_string(),
        fields: vec![
            AttributeSchema::new("file_url", AttributeType::String)
                .required()
                .with_description("URL link to the attachment."),
            AttributeSchema::new("mime_type", AttributeType::String)
                .required()
                .with_description("Internet media type (MIME type) of the attachment."),
            AttributeSchema::new("title", AttributeType::String)
                .with_description("Attachment title."),
        ],
    }
}

fn conference_type() -> AttributeType {
    AttributeType::Struct {
        name: "Conference".to_string(),
        fields: vec![
            AttributeSchema::new("google_meet_id", AttributeType::String)
                .required()
                .with_description("Hangouts Meet id, e.g. abc-defg-hij."),
        ],
    }
}

/// Returns the schema config for event
pub fn event_config() -> GoogleCalendarSchemaConfig {
    GoogleCalendarSchemaConfig {
        resource_type_name: "event",
        schema: ResourceSchema::new("googlecalendar.event")
            .with_description("An event on the primary calendar of the authenticated account.")
            .attribute(
                AttributeSchema::new("id", AttributeType::String)
                    .read_only()
                    .with_description("Identifier assigned by Google Calendar. (read-only)"),
            )
            .attribute(
                AttributeSchema::new("summary", AttributeType::String)
                    .required()
                    .with_description("Title of the event."),
            )
            .attribute(
                AttributeSchema::new("location", AttributeType::String)
                    .with_description("Geographic location of the event as free-form text."),
            )
            .attribute(
                AttributeSchema::new("description", AttributeType::String)
                    .with_description("Description of the event. Can contain HTML."),
            )
            .attribute(
                AttributeSchema::new("start", AttributeType::String)
                    .required()
                    .with_description("Start time as an RFC 3339 timestamp."),
            )
            .attribute(
                AttributeSchema::new("end", AttributeType::String)
                    .required()
                    .with_description("End time as an RFC 3339 timestamp."),
            )
            .attribute(
                AttributeSchema::new("timezone", AttributeType::String)
                    .required()
                    .with_description("IANA time zone name applied to both start and end."),
            )
            .attribute(
                AttributeSchema::new("guests_can_invite_others", AttributeType::Bool)
                    .computed()
                    .with_default(Value::Bool(true))
                    .with_description(
                        "Whether attendees other than the organizer can invite others.",
                    ),
            )
            .attribute(
                AttributeSchema::new("guests_can_modify", AttributeType::Bool)
                    .computed()
                    .with_default(Value::Bool(true))
                    .with_description(
                        "Whether attendees other than the organizer can modify the event.",
                    ),
            )
            .attribute(
                AttributeSchema::new("guests_can_see_other_guests", AttributeType::Bool)
                    .computed()
                    .with_default(Value::Bool(true))
                    .with_description(
                        "Whether attendees other than the organizer can see who the attendees are.",
                    ),
            )
            .attribute(
                AttributeSchema::new("show_as_available", AttributeType::Bool)
                    .computed()
                    .with_default(Value::Bool(false))
                    .with_description(
                        "Whether the event leaves the time free (transparent) instead of busy.",
                    ),
            )
            .attribute(
                AttributeSchema::new("send_notifications", AttributeType::Bool)
                    .computed()
                    .with_default(Value::Bool(true))
                    .with_description(
                        "Whether to notify attendees when the event is created, changed or deleted.",
                    ),
            )
            .attribute(
                AttributeSchema::new("visibility", visibility_type())
                    .computed()
                    .with_default(Value::from(""))
                    .with_description(
                        "Visibility of the event: public, private, or empty for the calendar default.",
                    ),
            )
            .attribute(
                AttributeSchema::new(
                    "recurrence",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .with_description("RRULE, EXRULE, RDATE and EXDATE lines (RFC 5545)."),
            )
            .attribute(
                AttributeSchema::new("conference", conference_type())
                    .with_description("Video conference attached to the event."),
            )
            .attribute(
                AttributeSchema::new("attendee", AttributeType::Set(Box::new(attendee_type())))
                    .with_description("Attendees of the event."),
            )
            .attribute(
                AttributeSchema::new(
                    "attachment",
                    AttributeType::Set(Box::new(attachment_type())),
                )
                .with_description("File attachments (Google Drive links)."),
            )
            .attribute(
                AttributeSchema::new("html_link", AttributeType::String)
                    .read_only()
                    .with_description(
                        "Link to the event in the Google Calendar web UI. (read-only)",
                    ),
            ),
    }
}
