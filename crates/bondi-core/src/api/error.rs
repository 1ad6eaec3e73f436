use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Hint printed along with configuration and login failures.
const CONFIG_HINT: &str = "Commands will help:\n - bondi config show\n - bondi config show --no-hide\n - bondi config init";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unable to find configuration. The first time run?\nPlease, run 'bondi config init' first")]
    ConfigurationMissing,

    #[error("Config file '{}' is corrupted: {reason}\nPlease, run 'bondi config init' to resolve the issue", .path.display())]
    ConfigurationCorrupted { path: PathBuf, reason: String },

    #[error("Login failure. Ensure, you've entered valid credentials\n{}", CONFIG_HINT)]
    AuthenticationFailed,

    #[error("Network failure occurred during request to '{url}'\nPlease, ensure API server is available and try again")]
    NetworkUnavailable {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("[{code}] {message}")]
    Api { code: String, message: String },

    #[error("Server rejected client data: {}", FieldErrors(.0))]
    Validation(Vec<FieldError>),

    #[error("Internal error occurred ({0}). Possibly, bug in client or API server\nPlease, contact support service to resolve the issue")]
    Internal(String),
}

impl ClientError {
    /// Whether re-running `bondi config init` is the likely remedy.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::AuthenticationFailed
                | ClientError::ConfigurationMissing
                | ClientError::ConfigurationCorrupted { .. }
        )
    }

    pub fn internal(context: impl Into<String>) -> Self {
        ClientError::Internal(context.into())
    }

    /// Describe an unexpected response body without dumping all of it.
    pub fn unexpected_body(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        ClientError::Internal(format!("unexpected response {}: {}", status, truncate_body(&text)))
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// A single field rejected by the server's input validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Location of the field as a dotted path, e.g. `body.pool.node_cpu`.
    pub fn location(&self) -> String {
        self.loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.msg)
    }
}

struct FieldErrors<'a>(&'a [FieldError]);

impl fmt::Display for FieldErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in self.0 {
            write!(f, "\n - {}", error)?;
        }
        Ok(())
    }
}
