//! Mapping between [`EventModel`] and the remote [`Event`]

use crate::api::{Event, EventAttachment, EventAttendee, EventDateTime};
use crate::model::{Attachment, Attendee, Conference, EventModel};
use crate::utils::{
    bool_to_transparency, meet_conference, meet_id_from_conference, non_empty,
    transparency_to_bool,
};

/// Build the remote representation of `model` on top of `base`
///
/// `base` is an empty event for inserts and the fetched remote event for
/// updates. Fields not modelled locally are kept as they are in `base`.
/// Existing attendees are matched by email and reused so their
/// remote-managed fields (response status, display name) survive.
pub fn build_event(model: &EventModel, base: Event) -> Event {
    let mut event = base;

    event.summary = Some(model.summary.clone());
    event.location = model.location.clone();
    event.description = model.description.clone();
    event.start = Some(date_time(&model.start, &model.timezone));
    event.end = Some(date_time(&model.end, &model.timezone));
    event.guests_can_invite_others = Some(model.guests_can_invite_others);
    event.guests_can_modify = Some(model.guests_can_modify);
    event.guests_can_see_other_guests = Some(model.guests_can_see_other_guests);
    event.transparency = Some(bool_to_transparency(model.show_as_available).to_string());
    event.visibility = non_empty(&model.visibility);
    event.recurrence = model.recurrence.clone();
    event.conference_data = model
        .conference
        .as_ref()
        .and_then(|c| meet_conference(&c.google_meet_id));

    let existing = std::mem::take(&mut event.attendees);
    event.attendees = model
        .attendees
        .iter()
        .map(|attendee| merge_attendee(&existing, attendee))
        .collect();

    event.attachments = model
        .attachments
        .iter()
        .map(|a| EventAttachment {
            file_url: Some(a.file_url.clone()),
            mime_type: Some(a.mime_type.clone()),
            title: a.title.clone(),
            ..EventAttachment::default()
        })
        .collect();

    event
}

fn date_time(value: &str, timezone: &str) -> EventDateTime {
    EventDateTime {
        date_time: Some(value.to_string()),
        time_zone: Some(timezone.to_string()),
        date: None,
    }
}

fn merge_attendee(existing: &[EventAttendee], desired: &Attendee) -> EventAttendee {
    let mut attendee = existing
        .iter()
        .find(|a| a.email.as_deref() == Some(desired.email.as_str()))
        .cloned()
        .unwrap_or_else(|| EventAttendee {
            email: Some(desired.email.clone()),
            ..EventAttendee::default()
        });
    attendee.optional = Some(desired.optional);
    attendee
}

/// Populate a model from a remote event
///
/// Every field is taken from `event`. Two exceptions fall back to `prior`:
/// `send_notifications`, which the API never returns, and the invite and
/// see-other-guests flags when the API omits them.
pub fn read_event(prior: &EventModel, event: &Event) -> EventModel {
    let (start, start_zone) = split_date_time(event.start.as_ref());
    let (end, end_zone) = split_date_time(event.end.as_ref());

    EventModel {
        id: event.id.clone().or_else(|| prior.id.clone()),
        summary: event.summary.clone().unwrap_or_default(),
        location: event.location.as_deref().and_then(non_empty),
        description: event.description.as_deref().and_then(non_empty),
        start,
        end,
        timezone: start_zone.or(end_zone).unwrap_or_default(),
        guests_can_invite_others: event
            .guests_can_invite_others
            .unwrap_or(prior.guests_can_invite_others),
        guests_can_modify: event.guests_can_modify.unwrap_or(false),
        guests_can_see_other_guests: event
            .guests_can_see_other_guests
            .unwrap_or(prior.guests_can_see_other_guests),
        show_as_available: transparency_to_bool(event.transparency.as_deref()),
        send_notifications: prior.send_notifications,
        visibility: event.visibility.clone().unwrap_or_default(),
        recurrence: event.recurrence.clone(),
        conference: event
            .conference_data
            .as_ref()
            .and_then(meet_id_from_conference)
            .map(|google_meet_id| Conference { google_meet_id }),
        attendees: event
            .attendees
            .iter()
            .filter_map(|a| {
                Some(Attendee {
                    email: a.email.clone()?,
                    optional: a.optional.unwrap_or(false),
                })
            })
            .collect(),
        attachments: event
            .attachments
            .iter()
            .map(|a| Attachment {
                file_url: a.file_url.clone().unwrap_or_default(),
                mime_type: a.mime_type.clone().unwrap_or_default(),
                title: a.title.as_deref().and_then(non_empty),
            })
            .collect(),
        html_link: event.html_link.clone(),
    }
}

/// Date-time (or all-day date) and zone of a start/end value
fn split_date_time(value: Option<&EventDateTime>) -> (String, Option<String>) {
    match value {
        Some(dt) => (
            dt.date_time
                .clone()
                .or_else(|| dt.date.clone())
                .unwrap_or_default(),
            dt.time_zone.clone().filter(|z| !z.is_empty()),
        ),
        None => (String::new(), None),
    }
}
