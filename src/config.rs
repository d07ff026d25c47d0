//! Bot configuration, loaded once from a JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

/// Default delay between polling cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default per-request timeout for calls to the server.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    base_url: String,
    client_id: String,
    client_secret: String,
    access_token: String,
    admins: Vec<String>,
    message: String,
    state_file: String,
    #[serde(default)]
    poll_interval_secs: Option<u64>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

/// Immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Server endpoint, without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    /// App registration secret. Requests authenticate with the access token alone.
    pub client_secret: SecretString,
    pub access_token: SecretString,
    /// Administrator handles, in the order they were configured.
    pub admins: Vec<String>,
    /// Reply template with every admin already appended as ` @handle`.
    pub message: String,
    pub state_file: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl BotConfig {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_home(path)?;
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?
                .join(path)
        };

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::from_json(&contents)
    }

    /// Parse and validate config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let base_url = raw.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "base_url".into(),
                message: "must not be empty".into(),
            });
        }

        for admin in &raw.admins {
            if admin.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "admins".into(),
                    message: "handles must not be empty".into(),
                });
            }
            if admin.starts_with('@') {
                return Err(ConfigError::InvalidValue {
                    key: "admins".into(),
                    message: format!("handle {admin:?} must be given without a leading '@'"),
                });
            }
        }

        let poll_interval_secs = raw.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "poll_interval_secs".into(),
                message: "must be at least 1".into(),
            });
        }

        let request_timeout_secs = raw
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }

        let message = compose_message(&raw.message, &raw.admins);
        let state_file = expand_home(Path::new(&raw.state_file))?;

        Ok(Self {
            base_url,
            client_id: raw.client_id,
            client_secret: SecretString::from(raw.client_secret),
            access_token: SecretString::from(raw.access_token),
            admins: raw.admins,
            message,
            state_file,
            poll_interval: Duration::from_secs(poll_interval_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Whether `handle` is one of the configured administrators.
    pub fn is_admin(&self, handle: &str) -> bool {
        self.admins.iter().any(|a| a == handle)
    }
}

/// Append every admin as ` @handle` to the template, preserving order.
fn compose_message(template: &str, admins: &[String]) -> String {
    let mut message = template.to_string();
    for admin in admins {
        message.push_str(" @");
        message.push_str(admin);
    }
    message
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or_else(|| ConfigError::NoHomeDir(path.display().to_string()))?;
    Ok(home.join(rest))
}
