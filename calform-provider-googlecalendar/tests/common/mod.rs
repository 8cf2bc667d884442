//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use calform_core::resource::{Resource, Value};
use calform_provider_googlecalendar::auth::TokenSource;
use calform_provider_googlecalendar::{CalendarClient, GoogleCalendarProvider};
use serde_json::json;
use wiremock::{MockServer, Request};

pub const TOKEN: &str = "ya29.test-token";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Provider talking to `server` with a fixed bearer token
pub fn provider_for(server: &MockServer) -> GoogleCalendarProvider {
    let client =
        CalendarClient::new(reqwest::Client::new(), TokenSource::fixed(TOKEN)).with_base_url(server.uri());
    GoogleCalendarProvider::with_client(Arc::new(client))
}

pub fn block(pairs: &[(&str, Value)]) -> Value {
    Value::Map(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

pub fn attendee(email: &str, optional: bool) -> Value {
    block(&[
        ("email", Value::from(email)),
        ("optional", Value::Bool(optional)),
    ])
}

/// Minimal valid event configuration
pub fn standup() -> Resource {
    Resource::new("event", "standup")
        .with_attribute("summary", Value::from("Standup"))
        .with_attribute("start", Value::from("2024-03-15T10:00:00+01:00"))
        .with_attribute("end", Value::from("2024-03-15T10:15:00+01:00"))
        .with_attribute("timezone", Value::from("Europe/Paris"))
}

/// Event as the Calendar API returns it
pub fn remote_event(id: &str) -> serde_json::Value {
    json!({
        "kind": "calendar#event",
        "etag": "\"3181161784712000\"",
        "id": id,
        "status": "confirmed",
        "htmlLink": format!("https://www.google.com/calendar/event?eid={}", id),
        "summary": "Standup",
        "start": {"dateTime": "2024-03-15T10:00:00+01:00", "timeZone": "Europe/Paris"},
        "end": {"dateTime": "2024-03-15T10:15:00+01:00", "timeZone": "Europe/Paris"},
        "transparency": "opaque",
        "guestsCanModify": true,
        "reminders": {"useDefault": true}
    })
}

/// JSON body of a recorded request
pub fn body_json(request: &Request) -> serde_json::Value {
    serde_json::from_slice(&request.body).unwrap()
}

/// All requests the server saw with the given method
pub async fn requests_with_method(server: &MockServer, method: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == method)
        .collect()
}
