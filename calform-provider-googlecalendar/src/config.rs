//! Provider configuration
//!
//! Resolves the credential material the provider authenticates with and the
//! user agent attached to every outbound call.

use std::fmt;
use std::path::{Path, PathBuf};

use calform_core::provider::{ConfigureRequest, ProviderError, ProviderResult};
use calform_core::resource::Value;

use crate::error::{ClientError, ClientResult};

/// Environment variables holding credentials (JSON or a path), in priority order
pub const CREDENTIALS_ENV_VARS: &[&str] = &[
    "GOOGLE_CREDENTIALS",
    "GOOGLE_CLOUD_KEYFILE_JSON",
    "GCLOUD_KEYFILE_JSON",
];

/// Environment variable holding a path to a credentials file
pub const APPLICATION_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

const WELL_KNOWN_FILE: &str = "gcloud/application_default_credentials.json";

/// Configuration of the provider block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfig {
    /// Credentials JSON, or a path to a file containing it
    pub credentials: Option<String>,
    /// Version reported by the host runtime
    pub host_version: Option<String>,
}

/// Where the credential material was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Env(&'static str),
    WellKnownFile(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit => write!(f, "provider configuration"),
            CredentialSource::Env(name) => write!(f, "environment variable {}", name),
            CredentialSource::WellKnownFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Credential JSON together with its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub source: CredentialSource,
    pub json: String,
}

impl ProviderConfig {
    /// Read the provider block handed over by the host
    pub fn from_request(request: &ConfigureRequest) -> ProviderResult<Self> {
        let credentials = match request.attributes.get("credentials") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ProviderError::validation(
                    "Provider attribute 'credentials' must be a string",
                ));
            }
        };

        Ok(Self {
            credentials,
            host_version: request.host_version.clone(),
        })
    }

    /// User agent sent with every request: `(<os> <arch>) Terraform/<version>`
    pub fn user_agent(&self) -> String {
        let version = match self.host_version.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => "unknown",
        };
        format!(
            "({} {}) Terraform/{}",
            std::env::consts::OS,
            std::env::consts::ARCH,
            version
        )
    }

    /// Resolve credentials from the configuration, then the process environment
    pub fn resolve_credentials(&self) -> ClientResult<ResolvedCredentials> {
        self.resolve_credentials_with(|name| std::env::var(name).ok(), well_known_file())
    }

    /// Resolve credentials with an explicit environment lookup
    ///
    /// Order: the `credentials` attribute, [`CREDENTIALS_ENV_VARS`],
    /// [`APPLICATION_CREDENTIALS_ENV`], then the gcloud well-known file if it
    /// exists. Empty values count as unset.
    pub fn resolve_credentials_with<F>(
        &self,
        env: F,
        well_known: Option<PathBuf>,
    ) -> ClientResult<ResolvedCredentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = self.credentials.as_deref().filter(|v| !v.trim().is_empty()) {
            return Ok(ResolvedCredentials {
                source: CredentialSource::Explicit,
                json: load_material(value)?,
            });
        }

        for &name in CREDENTIALS_ENV_VARS
            .iter()
            .chain(std::iter::once(&APPLICATION_CREDENTIALS_ENV))
        {
            if let Some(value) = env(name).filter(|v| !v.trim().is_empty()) {
                let json = if name == APPLICATION_CREDENTIALS_ENV {
                    read_file(Path::new(value.trim()))?
                } else {
                    load_material(&value)?
                };
                return Ok(ResolvedCredentials {
                    source: CredentialSource::Env(name),
                    json,
                });
            }
        }

        if let Some(path) = well_known.filter(|p| p.is_file()) {
            let json = read_file(&path)?;
            return Ok(ResolvedCredentials {
                source: CredentialSource::WellKnownFile(path),
                json,
            });
        }

        Err(ClientError::Credentials(format!(
            "no credentials found; set the provider 'credentials' attribute or one of {}, {}",
            CREDENTIALS_ENV_VARS.join(", "),
            APPLICATION_CREDENTIALS_ENV
        )))
    }
}

/// Credential value that is either JSON content or a path to it
fn load_material(value: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.starts_with('{') {
        Ok(trimmed.to_string())
    } else {
        read_file(Path::new(trimmed))
    }
}

fn read_file(path: &Path) -> ClientResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        ClientError::Credentials(format!(
            "failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Application default credentials written by gcloud
fn well_known_file() -> Option<PathBuf> {
    let base = if cfg!(windows) {
        dirs::config_dir()
    } else {
        dirs::home_dir().map(|home| home.join(".config"))
    };
    base.map(|dir| dir.join(WELL_KNOWN_FILE))
}
