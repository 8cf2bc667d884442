//! Google credentials and OAuth2 access tokens.
//!
//! Two kinds of key material are understood, distinguished by their `type`
//! field:
//!
//! - `service_account`: a signed JWT is exchanged for an access token
//!   (JWT bearer grant).
//! - `authorized_user`: a refresh token is exchanged for an access token
//!   (what `gcloud auth application-default login` writes).
//!
//! Tokens are fetched on first use and cached until shortly before expiry.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::{ClientError, ClientResult};

/// OAuth2 scope for full access to calendars and events
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Token endpoint used when the key material does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion and token lifetime requested from the token endpoint
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Tokens closer than this to expiry are refreshed
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Parsed key material
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
}

#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl Credentials {
    /// Parse JSON key material
    pub fn from_json(json: &str) -> ClientResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClientError::Credentials(format!("failed to parse credentials JSON: {}", e)))
    }

    fn token_uri(&self) -> &str {
        let uri = match self {
            Credentials::ServiceAccount(key) => key.token_uri.as_deref(),
            Credentials::AuthorizedUser(user) => user.token_uri.as_deref(),
        };
        uri.unwrap_or(DEFAULT_TOKEN_URI)
    }
}

// Key material never goes to logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ServiceAccount(key) => f
                .debug_struct("ServiceAccount")
                .field("client_email", &key.client_email)
                .finish_non_exhaustive(),
            Credentials::AuthorizedUser(user) => f
                .debug_struct("AuthorizedUser")
                .field("client_id", &user.client_id)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.signed_duration_since(now) > Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

enum Grant {
    Fixed(String),
    ServiceAccount {
        key: ServiceAccountKey,
        signing_key: EncodingKey,
    },
    AuthorizedUser(AuthorizedUser),
}

/// Source of bearer tokens for Calendar API requests
pub struct TokenSource {
    grant: Grant,
    token_uri: String,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grant = match self.grant {
            Grant::Fixed(_) => "fixed",
            Grant::ServiceAccount { .. } => "service_account",
            Grant::AuthorizedUser(_) => "authorized_user",
        };
        f.debug_struct("TokenSource")
            .field("grant", &grant)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Token source that always hands out the same token
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            grant: Grant::Fixed(token.into()),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Token source backed by key material
    ///
    /// Fails if a service account private key cannot be parsed, so broken
    /// credentials surface at configuration time rather than on first use.
    pub fn from_credentials(credentials: Credentials, http: reqwest::Client) -> ClientResult<Self> {
        let token_uri = credentials.token_uri().to_string();
        let grant = match credentials {
            Credentials::ServiceAccount(key) => {
                let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
                    .map_err(|e| {
                        ClientError::Credentials(format!(
                            "invalid private key for {}: {}",
                            key.client_email, e
                        ))
                    })?;
                Grant::ServiceAccount { key, signing_key }
            }
            Credentials::AuthorizedUser(user) => Grant::AuthorizedUser(user),
        };

        Ok(Self {
            grant,
            token_uri,
            http,
            cached: Mutex::new(None),
        })
    }

    /// Current access token, fetching a new one if needed
    pub async fn access_token(&self) -> ClientResult<String> {
        if let Grant::Fixed(token) = &self.grant {
            return Ok(token.clone());
        }

        // Held across the fetch so concurrent callers share one refresh
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.token.clone());
        }

        let token = self.fetch(now).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> ClientResult<AccessToken> {
        let form: Vec<(&str, String)> = match &self.grant {
            Grant::Fixed(token) => {
                return Ok(AccessToken {
                    token: token.clone(),
                    expires_at: now + Duration::days(365),
                });
            }
            Grant::ServiceAccount { key, signing_key } => {
                debug!("requesting access token for service account {}", key.client_email);
                let claims = JwtClaims {
                    iss: &key.client_email,
                    scope: CALENDAR_SCOPE,
                    aud: &self.token_uri,
                    iat: now.timestamp(),
                    exp: now.timestamp() + TOKEN_LIFETIME_SECS,
                };
                let mut header = Header::new(Algorithm::RS256);
                header.kid = key.private_key_id.clone();
                let assertion = jsonwebtoken::encode(&header, &claims, signing_key)
                    .map_err(|e| ClientError::Token(format!("failed to sign assertion: {}", e)))?;
                vec![
                    ("grant_type", JWT_BEARER_GRANT.to_string()),
                    ("assertion", assertion),
                ]
            }
            Grant::AuthorizedUser(user) => {
                debug!("refreshing access token for client {}", user.client_id);
                vec![
                    ("grant_type", "refresh_token".to_string()),
                    ("client_id", user.client_id.clone()),
                    ("client_secret", user.client_secret.clone()),
                    ("refresh_token", user.refresh_token.clone()),
                ]
            }
        };

        let response = self.http.post(&self.token_uri).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Token(format!("{} {}", status.as_u16(), body.trim())));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        let lifetime = parsed.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: expiry(now, lifetime)?,
        })
    }
}

fn expiry(now: DateTime<Utc>, lifetime: i64) -> ClientResult<DateTime<Utc>> {
    Duration::try_seconds(lifetime)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| ClientError::Token(format!("token lifetime out of range: {}", lifetime)))
}
