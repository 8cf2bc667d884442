//! Errors raised below the provider layer: credential handling and the
//! Calendar REST client.

use thiserror::Error;

/// Error from the Google Calendar client or its token source
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credential material is missing, unreadable or malformed
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// The token endpoint refused to issue an access token
    #[error("oauth2: cannot fetch token: {0}")]
    Token(String),

    /// The request never produced an HTTP response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The Calendar API answered with a non-success status
    #[error("googleapi: Error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
