//! Typed view of the `googlecalendar.event` attributes
//!
//! The host hands over loosely typed attribute maps. They are converted into
//! [`EventModel`] once, after schema validation, and the mapping code works on
//! the typed record only.

use std::collections::HashMap;

use calform_core::provider::{ProviderError, ProviderResult};
use calform_core::resource::Value;

/// Declarative state of one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventModel {
    /// Remote identifier, set once the event exists
    pub id: Option<String>,
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: String,
    pub end: String,
    pub timezone: String,
    pub guests_can_invite_others: bool,
    pub guests_can_modify: bool,
    pub guests_can_see_other_guests: bool,
    pub show_as_available: bool,
    pub send_notifications: bool,
    pub visibility: String,
    pub recurrence: Vec<String>,
    pub conference: Option<Conference>,
    pub attendees: Vec<Attendee>,
    pub attachments: Vec<Attachment>,
    pub html_link: Option<String>,
}

impl Default for EventModel {
    fn default() -> Self {
        Self {
            id: None,
            summary: String::new(),
            location: None,
            description: None,
            start: String::new(),
            end: String::new(),
            timezone: String::new(),
            guests_can_invite_others: true,
            guests_can_modify: true,
            guests_can_see_other_guests: true,
            show_as_available: false,
            send_notifications: true,
            visibility: String::new(),
            recurrence: Vec::new(),
            conference: None,
            attendees: Vec::new(),
            attachments: Vec::new(),
            html_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub email: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_url: String,
    pub mime_type: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conference {
    pub google_meet_id: String,
}

impl EventModel {
    /// Convert attribute values into a typed model
    ///
    /// Absent attributes take the model defaults; requiredness is the
    /// schema's concern. Values of the wrong shape are rejected.
    pub fn from_attributes(attributes: &HashMap<String, Value>) -> ProviderResult<Self> {
        let defaults = Self::default();
        let fields = Fields(attributes);

        Ok(Self {
            id: fields.string("id")?,
            summary: fields.string("summary")?.unwrap_or_default(),
            location: fields.string("location")?,
            description: fields.string("description")?,
            start: fields.string("start")?.unwrap_or_default(),
            end: fields.string("end")?.unwrap_or_default(),
            timezone: fields.string("timezone")?.unwrap_or_default(),
            guests_can_invite_others: fields
                .bool("guests_can_invite_others")?
                .unwrap_or(defaults.guests_can_invite_others),
            guests_can_modify: fields
                .bool("guests_can_modify")?
                .unwrap_or(defaults.guests_can_modify),
            guests_can_see_other_guests: fields
                .bool("guests_can_see_other_guests")?
                .unwrap_or(defaults.guests_can_see_other_guests),
            show_as_available: fields
                .bool("show_as_available")?
                .unwrap_or(defaults.show_as_available),
            send_notifications: fields
                .bool("send_notifications")?
                .unwrap_or(defaults.send_notifications),
            visibility: fields.string("visibility")?.unwrap_or_default(),
            recurrence: fields
                .list("recurrence")?
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| shape_error(&format!("recurrence[{}]", i), "a string"))
                })
                .collect::<ProviderResult<_>>()?,
            conference: conference_from_value(attributes.get("conference"))?,
            attendees: fields
                .list("attendee")?
                .iter()
                .enumerate()
                .map(|(i, v)| attendee_from_value(i, v))
                .collect::<ProviderResult<_>>()?,
            attachments: fields
                .list("attachment")?
                .iter()
                .enumerate()
                .map(|(i, v)| attachment_from_value(i, v))
                .collect::<ProviderResult<_>>()?,
            html_link: fields.string("html_link")?,
        })
    }

    /// Convert the model back into attribute values
    ///
    /// Absent optional values and empty collections are left out.
    pub fn to_attributes(&self) -> HashMap<String, Value> {
        let mut attrs = HashMap::new();

        if let Some(id) = &self.id {
            attrs.insert("id".to_string(), Value::from(id.as_str()));
        }
        attrs.insert("summary".to_string(), Value::from(self.summary.as_str()));
        if let Some(location) = &self.location {
            attrs.insert("location".to_string(), Value::from(location.as_str()));
        }
        if let Some(description) = &self.description {
            attrs.insert("description".to_string(), Value::from(description.as_str()));
        }
        attrs.insert("start".to_string(), Value::from(self.start.as_str()));
        attrs.insert("end".to_string(), Value::from(self.end.as_str()));
        attrs.insert("timezone".to_string(), Value::from(self.timezone.as_str()));
        attrs.insert(
            "guests_can_invite_others".to_string(),
            Value::Bool(self.guests_can_invite_others),
        );
        attrs.insert(
            "guests_can_modify".to_string(),
            Value::Bool(self.guests_can_modify),
        );
        attrs.insert(
            "guests_can_see_other_guests".to_string(),
            Value::Bool(self.guests_can_see_other_guests),
        );
        attrs.insert(
            "show_as_available".to_string(),
            Value::Bool(self.show_as_available),
        );
        attrs.insert(
            "send_notifications".to_string(),
            Value::Bool(self.send_notifications),
        );
        attrs.insert(
            "visibility".to_string(),
            Value::from(self.visibility.as_str()),
        );

        if !self.recurrence.is_empty() {
            attrs.insert(
                "recurrence".to_string(),
                Value::List(
                    self.recurrence
                        .iter()
                        .map(|r| Value::from(r.as_str()))
                        .collect(),
                ),
            );
        }

        if let Some(conference) = &self.conference {
            let mut map = HashMap::new();
            map.insert(
                "google_meet_id".to_string(),
                Value::from(conference.google_meet_id.as_str()),
            );
            attrs.insert("conference".to_string(), Value::Map(map));
        }

        if !self.attendees.is_empty() {
            let items = self
                .attendees
                .iter()
                .map(|a| {
                    let mut map = HashMap::new();
                    map.insert("email".to_string(), Value::from(a.email.as_str()));
                    map.insert("optional".to_string(), Value::Bool(a.optional));
                    Value::Map(map)
                })
                .collect();
            attrs.insert("attendee".to_string(), Value::List(items));
        }

        if !self.attachments.is_empty() {
            let items = self
                .attachments
                .iter()
                .map(|a| {
                    let mut map = HashMap::new();
                    map.insert("file_url".to_string(), Value::from(a.file_url.as_str()));
                    map.insert("mime_type".to_string(), Value::from(a.mime_type.as_str()));
                    if let Some(title) = &a.title {
                        map.insert("title".to_string(), Value::from(title.as_str()));
                    }
                    Value::Map(map)
                })
                .collect();
            attrs.insert("attachment".to_string(), Value::List(items));
        }

        if let Some(link) = &self.html_link {
            attrs.insert("html_link".to_string(), Value::from(link.as_str()));
        }

        attrs
    }
}

/// Typed lookups over an attribute map
struct Fields<'a>(&'a HashMap<String, Value>);

impl Fields<'_> {
    fn string(&self, name: &str) -> ProviderResult<Option<String>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(shape_error(name, "a string")),
        }
    }

    fn bool(&self, name: &str) -> ProviderResult<Option<bool>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(shape_error(name, "a bool")),
        }
    }

    fn list(&self, name: &str) -> ProviderResult<&[Value]> {
        match self.0.get(name) {
            None => Ok(&[]),
            Some(Value::List(items)) => Ok(items),
            Some(_) => Err(shape_error(name, "a list")),
        }
    }
}

fn shape_error(name: &str, expected: &str) -> ProviderError {
    ProviderError::validation(format!("Attribute '{}' must be {}", name, expected))
}

fn conference_from_value(value: Option<&Value>) -> ProviderResult<Option<Conference>> {
    let map = match value {
        None => return Ok(None),
        Some(Value::Map(map)) => map,
        Some(_) => return Err(shape_error("conference", "a block")),
    };
    let fields = Fields(map);
    Ok(fields
        .string("google_meet_id")?
        .filter(|id| !id.is_empty())
        .map(|google_meet_id| Conference { google_meet_id }))
}

fn attendee_from_value(index: usize, value: &Value) -> ProviderResult<Attendee> {
    let name = format!("attendee[{}]", index);
    let map = value
        .as_map()
        .ok_or_else(|| shape_error(&name, "a block"))?;
    let fields = Fields(map);
    Ok(Attendee {
        email: fields
            .string("email")?
            .ok_or_else(|| shape_error(&format!("{}.email", name), "set"))?,
        optional: fields.bool("optional")?.unwrap_or(false),
    })
}

fn attachment_from_value(index: usize, value: &Value) -> ProviderResult<Attachment> {
    let name = format!("attachment[{}]", index);
    let map = value
        .as_map()
        .ok_or_else(|| shape_error(&name, "a block"))?;
    let fields = Fields(map);
    Ok(Attachment {
        file_url: fields
            .string("file_url")?
            .ok_or_else(|| shape_error(&format!("{}.file_url", name), "set"))?,
        mime_type: fields
            .string("mime_type")?
            .ok_or_else(|| shape_error(&format!("{}.mime_type", name), "set"))?,
        title: fields.string("title")?.filter(|t| !t.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(&str, Value)]) -> Value {
        Value::Map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn sample_attributes() -> HashMap<String, Value> {
        let mut attrs = HashMap::new();
        attrs.insert("summary".to_string(), Value::from("Standup"));
        attrs.insert("start".to_string(), Value::from("2024-03-15T10:00:00+01:00"));
        attrs.insert("end".to_string(), Value::from("2024-03-15T10:15:00+01:00"));
        attrs.insert("timezone".to_string(), Value::from("Europe/Paris"));
        attrs.insert(
            "recurrence".to_string(),
            Value::List(vec![Value::from("RRULE:FREQ=WEEKLY")]),
        );
        attrs.insert(
            "conference".to_string(),
            block(&[("google_meet_id", Value::from("abc-defg-hij"))]),
        );
        attrs.insert(
            "attendee".to_string(),
            Value::List(vec![block(&[
                ("email", Value::from("alice@example.com")),
                ("optional", Value::Bool(true)),
            ])]),
        );
        attrs.insert(
            "attachment".to_string(),
            Value::List(vec![block(&[
                ("file_url", Value::from("https://drive.google.com/file/d/1")),
                ("mime_type", Value::from("application/pdf")),
            ])]),
        );
        attrs
    }

    #[test]
    fn from_attributes_applies_model_defaults() {
        let model = EventModel::from_attributes(&sample_attributes()).unwrap();
        assert_eq!(model.summary, "Standup");
        assert_eq!(model.timezone, "Europe/Paris");
        assert!(model.guests_can_invite_others);
        assert!(model.guests_can_modify);
        assert!(model.guests_can_see_other_guests);
        assert!(!model.show_as_available);
        assert!(model.send_notifications);
        assert_eq!(model.visibility, "");
        assert_eq!(model.recurrence, vec!["RRULE:FREQ=WEEKLY"]);
        assert_eq!(
            model.conference,
            Some(Conference {
                google_meet_id: "abc-defg-hij".to_string()
            })
        );
        assert_eq!(
            model.attendees,
            vec![Attendee {
                email: "alice@example.com".to_string(),
                optional: true
            }]
        );
        assert_eq!(model.attachments[0].title, None);
    }

    #[test]
    fn attributes_round_trip() {
        let model = EventModel::from_attributes(&sample_attributes()).unwrap();
        let again = EventModel::from_attributes(&model.to_attributes()).unwrap();
        assert_eq!(model, again);
    }

    #[test]
    fn to_attributes_omits_absent_values() {
        let model = EventModel {
            summary: "Standup".to_string(),
            ..EventModel::default()
        };
        let attrs = model.to_attributes();
        for absent in [
            "id",
            "location",
            "description",
            "recurrence",
            "conference",
            "attendee",
            "attachment",
            "html_link",
        ] {
            assert!(!attrs.contains_key(absent), "{} should be absent", absent);
        }
        assert_eq!(attrs.get("visibility"), Some(&Value::from("")));
        assert_eq!(attrs.get("send_notifications"), Some(&Value::Bool(true)));
    }

    #[test]
    fn wrong_shapes_are_rejected() {
        let mut attrs = sample_attributes();
        attrs.insert("guests_can_modify".to_string(), Value::from("yes"));
        let err = EventModel::from_attributes(&attrs).unwrap_err();
        assert!(err.message.contains("guests_can_modify"));

        let mut attrs = sample_attributes();
        attrs.insert(
            "attendee".to_string(),
            Value::List(vec![block(&[("optional", Value::Bool(true))])]),
        );
        let err = EventModel::from_attributes(&attrs).unwrap_err();
        assert!(err.message.contains("attendee[0].email"));
    }

    #[test]
    fn empty_meet_id_is_no_conference() {
        let mut attrs = sample_attributes();
        attrs.insert(
            "conference".to_string(),
            block(&[("google_meet_id", Value::from(""))]),
        );
        let model = EventModel::from_attributes(&attrs).unwrap();
        assert_eq!(model.conference, None);
    }
}
