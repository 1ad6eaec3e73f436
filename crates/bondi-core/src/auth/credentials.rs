use std::fmt;
use std::path::Path;

use reqwest::Url;
use tracing::debug;

use crate::config::AuthConfig;
use crate::{ClientError, Result};

/// Environment variables consulted when there is no config file.
pub const ENV_SERVER_URL: &str = "BONDI_SERVER_URL";
pub const ENV_USERNAME: &str = "BONDI_USERNAME";
pub const ENV_PASSWORD: &str = "BONDI_PASSWORD";

/// Where to send requests and how to log in. Held immutably by the client.
#[derive(Clone)]
pub struct Credentials {
    base_url: Url,
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(config: AuthConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| ClientError::internal(format!("invalid server url: {}", e)))?;
        Ok(Self {
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    /// Resolve credentials from the config file at `path`, falling back to
    /// the `BONDI_*` environment variables when the file does not exist.
    pub fn resolve(path: &Path) -> Result<Self> {
        Self::resolve_with(path, |name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match AuthConfig::load(path) {
            Ok(config) => Self::new(config),
            Err(ClientError::ConfigurationMissing) => {
                debug!(path = %path.display(), "No config file, reading environment");
                Self::from_lookup(lookup)
            }
            Err(e) => Err(e),
        }
    }

    /// Read all three settings through `lookup`; each of them must be set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_SERVER_URL).ok_or(ClientError::ConfigurationMissing)?;
        let username = lookup(ENV_USERNAME).ok_or(ClientError::ConfigurationMissing)?;
        let password = lookup(ENV_PASSWORD).ok_or(ClientError::ConfigurationMissing)?;
        Self::new(AuthConfig::new(&url, &username, &password)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Absolute URL of an API path such as `/api/v1/meta`.
    ///
    /// The path is appended to the base URL, so a server mounted under a
    /// prefix (`https://host/bondi`) keeps its prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| ClientError::internal(format!("invalid endpoint '{}': {}", path, e)))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_requires_all_three() {
        let full = env(&[
            (ENV_SERVER_URL, "http://api.local"),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "pw"),
        ]);
        let credentials = Credentials::from_lookup(full).unwrap();
        assert_eq!(credentials.username(), "alice");

        let partial = env(&[(ENV_SERVER_URL, "http://api.local"), (ENV_USERNAME, "alice")]);
        assert!(matches!(
            Credentials::from_lookup(partial),
            Err(ClientError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_resolve_prefers_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        AuthConfig::new("http://from-file", "file-user", "pw")
            .unwrap()
            .save(&path)
            .unwrap();

        let lookup = env(&[
            (ENV_SERVER_URL, "http://from-env"),
            (ENV_USERNAME, "env-user"),
            (ENV_PASSWORD, "pw"),
        ]);
        let credentials = Credentials::resolve_with(&path, lookup).unwrap();
        assert_eq!(credentials.username(), "file-user");
    }

    #[test]
    fn test_resolve_falls_back_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let lookup = env(&[
            (ENV_SERVER_URL, "http://from-env"),
            (ENV_USERNAME, "env-user"),
            (ENV_PASSWORD, "pw"),
        ]);
        let credentials = Credentials::resolve_with(&path, lookup).unwrap();
        assert_eq!(credentials.username(), "env-user");

        assert!(matches!(
            Credentials::resolve_with(&path, env(&[])),
            Err(ClientError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_endpoint_keeps_prefix() {
        let config = AuthConfig::new("https://host/bondi/", "u", "p").unwrap();
        let credentials = Credentials::new(config).unwrap();
        assert_eq!(
            credentials.endpoint("/api/v1/auth/login").unwrap().as_str(),
            "https://host/bondi/api/v1/auth/login"
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let config = AuthConfig::new("https://host", "u", "hunter2").unwrap();
        let credentials = Credentials::new(config).unwrap();
        assert!(!format!("{:?}", credentials).contains("hunter2"));
    }
}
