use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crash found by a fuzzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crash {
    pub id: String,
    pub created: DateTime<Utc>,
    /// Start of the crashing input, base64-encoded.
    pub preview: String,
    /// crash, oom, timeout, leak, ...
    #[serde(rename = "type")]
    pub kind: String,
    pub brief: String,
    /// Stack trace and sanitizer output.
    #[serde(default)]
    pub details: Option<String>,
    pub reproduced: bool,
    pub duplicate_count: u32,
}
