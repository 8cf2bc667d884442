//! Calendar API v3 client
//!
//! A thin REST client over `reqwest` covering the four event calls the
//! provider needs. Every request carries a bearer token from [`TokenSource`].

use log::debug;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::api::{ErrorResponse, Event};
use crate::auth::TokenSource;
use crate::error::{ClientError, ClientResult};

/// Base URL of the Calendar API v3
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Cap on attendees returned in a response
pub const MAX_ATTENDEES: u32 = 25;

/// Query options sent with insert and update calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOptions {
    pub supports_attachments: bool,
    pub conference_data_version: u8,
    pub send_notifications: bool,
    pub max_attendees: u32,
}

impl MutationOptions {
    /// Options used for every event mutation
    pub fn new(send_notifications: bool) -> Self {
        Self {
            supports_attachments: true,
            conference_data_version: 1,
            send_notifications,
            max_attendees: MAX_ATTENDEES,
        }
    }

    fn query(&self) -> [(&'static str, String); 4] {
        [
            ("supportsAttachments", self.supports_attachments.to_string()),
            (
                "conferenceDataVersion",
                self.conference_data_version.to_string(),
            ),
            ("sendNotifications", self.send_notifications.to_string()),
            ("maxAttendees", self.max_attendees.to_string()),
        ]
    }
}

/// Authenticated Calendar API client
#[derive(Debug)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenSource,
}

impl CalendarClient {
    pub fn new(http: reqwest::Client, tokens: TokenSource) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            tokens,
        }
    }

    /// Point the client at another endpoint (test servers, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create an event
    pub async fn insert_event(
        &self,
        calendar_id: &str,
        event: &Event,
        options: MutationOptions,
    ) -> ClientResult<Event> {
        let url = self.events_url(calendar_id);
        debug!("inserting event into calendar {}", calendar_id);
        let request = self
            .request(Method::POST, &url)
            .await?
            .query(&options.query())
            .json(event);
        self.send_json(request).await
    }

    /// Fetch an event by id
    pub async fn get_event(&self, calendar_id: &str, event_id: &str) -> ClientResult<Event> {
        let url = self.event_url(calendar_id, event_id);
        debug!("fetching event {} from calendar {}", event_id, calendar_id);
        let request = self.request(Method::GET, &url).await?;
        self.send_json(request).await
    }

    /// Replace an event with the given representation
    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &Event,
        options: MutationOptions,
    ) -> ClientResult<Event> {
        let url = self.event_url(calendar_id, event_id);
        debug!("updating event {} in calendar {}", event_id, calendar_id);
        let request = self
            .request(Method::PUT, &url)
            .await?
            .query(&options.query())
            .json(event);
        self.send_json(request).await
    }

    /// Delete an event
    pub async fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        send_notifications: bool,
    ) -> ClientResult<()> {
        let url = self.event_url(calendar_id, event_id);
        debug!("deleting event {} from calendar {}", event_id, calendar_id);
        let request = self
            .request(Method::DELETE, &url)
            .await?
            .query(&[("sendNotifications", send_notifications.to_string())]);
        let response = request.send().await?;
        check_status(response).await.map(|_| ())
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    async fn request(&self, method: Method, url: &str) -> ClientResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Turn non-success responses into [`ClientError::Api`]
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
        _ => body.trim().to_string(),
    };
    debug!("calendar API returned {}: {}", status.as_u16(), message);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
