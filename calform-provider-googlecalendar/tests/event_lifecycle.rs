//! Event create/read/update/delete against a mocked Calendar API

mod common;

use calform_core::lifecycle;
use calform_core::provider::{Provider, ProviderErrorKind};
use calform_core::resource::{ResourceId, State, Value};
use common::*;
use serde_json::json;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendars/primary/events";

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_sends_mapped_event_and_populates_state() {
    init_logging();
    let server = MockServer::start().await;

    let mut response = remote_event("evt1");
    response["recurrence"] = json!(["RRULE:FREQ=WEEKLY"]);
    response["attendees"] = json!([{"email": "a@x", "responseStatus": "needsAction"}]);
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(query_param("supportsAttachments", "true"))
        .and(query_param("conferenceDataVersion", "1"))
        .and(query_param("sendNotifications", "true"))
        .and(query_param("maxAttendees", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let resource = standup()
        .with_attribute(
            "recurrence",
            Value::List(vec![Value::from("RRULE:FREQ=WEEKLY")]),
        )
        .with_attribute(
            "attendee",
            Value::List(vec![block(&[("email", Value::from("a@x"))])]),
        );

    let provider = provider_for(&server);
    let state = lifecycle::create(&provider, &resource).await.unwrap();

    let posted = requests_with_method(&server, "POST").await;
    assert_eq!(posted.len(), 1);
    let body = body_json(&posted[0]);
    assert_eq!(body["recurrence"], json!(["RRULE:FREQ=WEEKLY"]));
    assert_eq!(body["attendees"], json!([{"email": "a@x", "optional": false}]));
    assert!(body.get("conferenceData").is_none());
    assert_eq!(body["transparency"], json!("opaque"));
    assert_eq!(body["start"]["timeZone"], json!("Europe/Paris"));

    assert!(state.exists);
    assert_eq!(state.identifier.as_deref(), Some("evt1"));
    assert_eq!(state.attributes["id"], Value::from("evt1"));
    assert_eq!(
        state.attributes["html_link"],
        Value::from("https://www.google.com/calendar/event?eid=evt1")
    );
    assert_eq!(state.attributes["send_notifications"], Value::Bool(true));
    assert_eq!(
        state.attributes["attendee"],
        Value::List(vec![attendee("a@x", false)])
    );
    assert!(!state.attributes.contains_key("location"));
}

#[tokio::test]
async fn create_with_conference_and_notifications_disabled() {
    init_logging();
    let server = MockServer::start().await;

    let mut response = remote_event("evt2");
    response["conferenceData"] = json!({
        "conferenceId": "abc-defg-hij",
        "conferenceSolution": {"key": {"type": "hangoutsMeet"}, "name": "Google Meet"},
        "entryPoints": [
            {"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij", "label": "meet.google.com/abc-defg-hij"}
        ]
    });
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(query_param("sendNotifications", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let resource = standup()
        .with_attribute("send_notifications", Value::Bool(false))
        .with_attribute(
            "conference",
            block(&[("google_meet_id", Value::from("abc-defg-hij"))]),
        );

    let state = provider_for(&server).create(&resource).await.unwrap();

    let body = body_json(&requests_with_method(&server, "POST").await[0]);
    assert_eq!(
        body["conferenceData"],
        json!({
            "conferenceSolution": {"key": {"type": "hangoutsMeet"}},
            "entryPoints": [{
                "entryPointType": "video",
                "uri": "https://meet.google.com/abc-defg-hij",
                "label": "meet.google.com/abc-defg-hij"
            }]
        })
    );
    assert_eq!(
        state.attributes["conference"],
        block(&[("google_meet_id", Value::from("abc-defg-hij"))])
    );
    assert_eq!(state.attributes["send_notifications"], Value::Bool(false));
}

#[tokio::test]
async fn create_failure_reports_remote_error() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "The caller does not have permission"}
        })))
        .mount(&server)
        .await;

    let err = lifecycle::create(&provider_for(&server), &standup())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Remote);
    assert_eq!(
        err.to_string(),
        "[event.standup] Could not create event: googleapi: Error 403: The caller does not have permission"
    );
}

#[tokio::test]
async fn invalid_visibility_makes_no_request() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let resource = standup().with_attribute("visibility", Value::from("confidential"));
    let err = provider_for(&server).create(&resource).await.unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Validation);
    assert!(err.message.contains("confidential"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Read
// ============================================================================

fn existing_state(send_notifications: bool) -> State {
    let mut attributes = standup().attributes;
    attributes.insert(
        "send_notifications".to_string(),
        Value::Bool(send_notifications),
    );
    attributes.insert("guests_can_invite_others".to_string(), Value::Bool(false));
    State::existing(ResourceId::new("event", "standup"), attributes).with_identifier("evt1")
}

#[tokio::test]
async fn read_refreshes_every_field() {
    init_logging();
    let server = MockServer::start().await;

    let mut response = remote_event("evt1");
    response["summary"] = json!("Standup (moved)");
    response["location"] = json!("");
    response["description"] = json!("Daily sync");
    response["transparency"] = json!("transparent");
    response["visibility"] = json!("private");
    response["attachments"] = json!([{
        "fileUrl": "https://drive.google.com/file/d/1",
        "mimeType": "application/pdf",
        "title": "Agenda",
        "fileId": "1"
    }]);
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = existing_state(false);
    lifecycle::refresh(&provider_for(&server), &mut state)
        .await
        .unwrap();

    let attrs = &state.attributes;
    assert_eq!(state.identifier.as_deref(), Some("evt1"));
    assert_eq!(attrs["summary"], Value::from("Standup (moved)"));
    assert!(!attrs.contains_key("location"));
    assert_eq!(attrs["description"], Value::from("Daily sync"));
    assert_eq!(attrs["show_as_available"], Value::Bool(true));
    assert_eq!(attrs["visibility"], Value::from("private"));
    assert_eq!(attrs["guests_can_modify"], Value::Bool(true));
    // not returned by the API: prior values kept
    assert_eq!(attrs["guests_can_invite_others"], Value::Bool(false));
    assert_eq!(attrs["guests_can_see_other_guests"], Value::Bool(true));
    assert_eq!(attrs["send_notifications"], Value::Bool(false));
    assert_eq!(
        attrs["attachment"],
        Value::List(vec![block(&[
            ("file_url", Value::from("https://drive.google.com/file/d/1")),
            ("mime_type", Value::from("application/pdf")),
            ("title", Value::from("Agenda")),
        ])])
    );
    assert!(!attrs.contains_key("conference"));
}

#[tokio::test]
async fn read_of_missing_event_is_an_error_and_keeps_state() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not Found"}
        })))
        .mount(&server)
        .await;

    let mut state = existing_state(true);
    let before = state.clone();
    let err = lifecycle::refresh(&provider_for(&server), &mut state)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Remote);
    assert!(
        err.message
            .starts_with("Could not read event evt1: googleapi: Error 404")
    );
    assert_eq!(state, before);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn update_merges_attendees_and_keeps_remote_fields() {
    init_logging();
    let server = MockServer::start().await;

    let mut current = remote_event("evt1");
    current["attendees"] = json!([
        {"email": "alice@x", "responseStatus": "accepted", "displayName": "Alice"},
        {"email": "carol@x", "responseStatus": "declined"}
    ]);
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current))
        .expect(1)
        .mount(&server)
        .await;

    let mut updated = remote_event("evt1");
    updated["summary"] = json!("Retro");
    updated["attendees"] = json!([
        {"email": "alice@x", "optional": true, "responseStatus": "accepted"},
        {"email": "bob@x", "responseStatus": "needsAction"}
    ]);
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .and(query_param("supportsAttachments", "true"))
        .and(query_param("conferenceDataVersion", "1"))
        .and(query_param("maxAttendees", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let desired = standup()
        .with_attribute("summary", Value::from("Retro"))
        .with_attribute(
            "attendee",
            Value::List(vec![attendee("alice@x", true), attendee("bob@x", false)]),
        );

    let mut state = existing_state(true);
    lifecycle::update(&provider_for(&server), &mut state, &desired)
        .await
        .unwrap();

    let put = requests_with_method(&server, "PUT").await;
    let body = body_json(&put[0]);
    assert_eq!(
        body["attendees"],
        json!([
            {"email": "alice@x", "optional": true, "responseStatus": "accepted", "displayName": "Alice"},
            {"email": "bob@x", "optional": false}
        ])
    );
    assert_eq!(body["summary"], json!("Retro"));
    assert_eq!(body["etag"], json!("\"3181161784712000\""));
    assert_eq!(body["reminders"], json!({"useDefault": true}));

    assert_eq!(state.identifier.as_deref(), Some("evt1"));
    assert_eq!(state.attributes["summary"], Value::from("Retro"));
    assert_eq!(
        state.attributes["attendee"],
        Value::List(vec![attendee("alice@x", true), attendee("bob@x", false)])
    );
}

#[tokio::test]
async fn update_clears_fields_absent_from_configuration() {
    init_logging();
    let server = MockServer::start().await;

    let mut current = remote_event("evt1");
    current["location"] = json!("Room 1");
    current["description"] = json!("Daily sync");
    current["recurrence"] = json!(["RRULE:FREQ=DAILY"]);
    current["conferenceData"] = json!({
        "conferenceSolution": {"key": {"type": "hangoutsMeet"}},
        "entryPoints": [{"entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij"}]
    });
    current["attendees"] = json!([{"email": "alice@x", "responseStatus": "accepted"}]);
    current["attachments"] = json!([{
        "fileUrl": "https://drive.google.com/file/d/1",
        "mimeType": "application/pdf"
    }]);
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_event("evt1")))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = existing_state(true);
    lifecycle::update(&provider_for(&server), &mut state, &standup())
        .await
        .unwrap();

    let put = requests_with_method(&server, "PUT").await;
    let body = body_json(&put[0]);
    for field in [
        "location",
        "description",
        "recurrence",
        "conferenceData",
        "attendees",
        "attachments",
    ] {
        assert!(body.get(field).is_none(), "{} should be cleared", field);
    }
    assert_eq!(body["etag"], json!("\"3181161784712000\""));

    for attr in ["location", "description", "recurrence", "conference", "attendee", "attachment"] {
        assert!(!state.attributes.contains_key(attr), "{} left in state", attr);
    }
}

#[tokio::test]
async fn failed_update_leaves_state_untouched() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_event("evt1")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Bad Request"}
        })))
        .mount(&server)
        .await;

    let mut state = existing_state(true);
    let before = state.clone();
    let err = lifecycle::update(&provider_for(&server), &mut state, &standup())
        .await
        .unwrap_err();

    assert_eq!(
        err.message,
        "Could not update event evt1: googleapi: Error 400: Bad Request"
    );
    assert_eq!(state, before);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_without_notifications_clears_identity() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/evt1"))
        .and(query_param("sendNotifications", "false"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = existing_state(false);
    lifecycle::destroy(&provider_for(&server), &mut state)
        .await
        .unwrap();

    assert!(!state.exists);
    assert!(state.identifier.is_none());
    assert_eq!(state.id, ResourceId::new("event", "standup"));
}

#[tokio::test]
async fn failed_delete_keeps_identity() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/evt1"))
        .and(query_param("sendNotifications", "true"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&server)
        .await;

    let mut state = existing_state(true);
    let err = lifecycle::destroy(&provider_for(&server), &mut state)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProviderErrorKind::Remote);
    assert_eq!(
        err.message,
        "Could not delete event evt1: googleapi: Error 500: backend error"
    );
    assert!(state.exists);
    assert_eq!(state.identifier.as_deref(), Some("evt1"));
}
