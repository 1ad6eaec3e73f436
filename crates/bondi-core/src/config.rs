//! Persisted client configuration.
//!
//! The configuration holds the API server URL and the account credentials
//! used to log in. It is stored at `~/.config/bondi/config.json`; the session
//! obtained from the last login is kept next to it (see `auth::session`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ClientError, Result};

/// Application name used for the config directory path
const APP_NAME: &str = "bondi";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Field names accepted by [`AuthConfig::get`] and [`AuthConfig::set`].
pub const FIELD_NAMES: [&str; 3] = ["url", "username", "password"];

/// Connection settings for one Bondifuzz account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    /// Build a config, rejecting empty values and non-HTTP URLs.
    pub fn new(url: &str, username: &str, password: &str) -> Result<Self> {
        let config = Self {
            url: non_empty("url", url)?,
            username: non_empty("username", username)?,
            password: non_empty("password", password)?,
        };
        validate_url(&config.url)?;
        Ok(config)
    }

    /// Load the config from `path`.
    ///
    /// Returns `ConfigurationMissing` if there is no file and
    /// `ConfigurationCorrupted` if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClientError::ConfigurationMissing);
        }

        let corrupted = |reason: String| ClientError::ConfigurationCorrupted {
            path: path.to_path_buf(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| corrupted(e.to_string()))?;
        let config: AuthConfig =
            serde_json::from_str(&contents).map_err(|e| corrupted(e.to_string()))?;
        Self::new(&config.url, &config.username, &config.password)
            .map_err(|e| corrupted(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let write_failed = |e: std::io::Error| {
            ClientError::internal(format!("failed to write config '{}': {}", path.display(), e))
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::internal(e.to_string()))?;
        std::fs::write(path, contents).map_err(write_failed)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "url" => Some(&self.url),
            "username" => Some(&self.username),
            "password" => Some(&self.password),
            _ => None,
        }
    }

    /// Replace a field by name, validating the new value.
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let updated = match field {
            "url" => Self::new(value, &self.username, &self.password)?,
            "username" => Self::new(&self.url, value, &self.password)?,
            "password" => Self::new(&self.url, &self.username, value)?,
            _ => return Err(invalid(field, "Unknown field name")),
        };
        *self = updated;
        Ok(())
    }

    /// `(field, value)` rows for display, password masked unless `reveal`.
    pub fn display_rows(&self, reveal: bool) -> Vec<(&'static str, String)> {
        let password = if reveal {
            self.password.clone()
        } else {
            "*".repeat(self.password.chars().count())
        };
        vec![
            ("url", self.url.clone()),
            ("username", self.username.clone()),
            ("password", password),
        ]
    }
}

/// Directory holding the config and the persisted session.
pub fn app_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ClientError::internal("could not find config directory"))?;
    Ok(config_dir.join(APP_NAME))
}

/// Default location of the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join(CONFIG_FILE))
}

fn non_empty(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(field, "Empty string not allowed"));
    }
    Ok(value.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(invalid("url", "Provided string is not a valid http(s) URL")),
    }
}

fn invalid(field: &str, msg: &str) -> ClientError {
    ClientError::Validation(vec![crate::api::FieldError {
        loc: vec![serde_json::Value::String(field.to_string())],
        msg: msg.to_string(),
        kind: "value_error".to_string(),
    }])
}
