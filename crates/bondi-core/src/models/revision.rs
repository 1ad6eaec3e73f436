//! Fuzzer revisions: one uploaded build of a fuzzer and its run state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStatus {
    pub uploaded: bool,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.last_error {
            Some(error) => write!(f, "Upload failure - {}", error),
            None if self.uploaded => f.write_str("Uploaded"),
            None => f.write_str("Not uploaded"),
        }
    }
}

/// Last messages from the scheduler and the fuzzing agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFeedback {
    pub scheduler: RunError,
    #[serde(default)]
    pub agent: Option<RunError>,
}

impl fmt::Display for RunFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scheduler: {}", self.scheduler)?;
        if let Some(agent) = &self.agent {
            write!(f, "\nAgent: {}", agent)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revision {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub health: String,
    /// mcpu
    pub cpu_usage: u64,
    /// MB
    pub ram_usage: u64,
    /// MB
    pub tmpfs_size: u64,
    pub binaries: UploadStatus,
    pub seeds: UploadStatus,
    pub config: UploadStatus,
    pub image_id: String,
    #[serde(default)]
    pub feedback: Option<RunFeedback>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub last_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_stop_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub erasure_date: Option<DateTime<Utc>>,
}

impl Revision {
    pub fn is_deleted(&self) -> bool {
        self.erasure_date.is_some()
    }
}

/// Run control actions accepted under `.../actions/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionAction {
    Start,
    Restart,
    Stop,
}

impl RevisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionAction::Start => "start",
            RevisionAction::Restart => "restart",
            RevisionAction::Stop => "stop",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_status_display() {
        let ok = UploadStatus { uploaded: true, last_error: None };
        assert_eq!(ok.to_string(), "Uploaded");

        let missing = UploadStatus { uploaded: false, last_error: None };
        assert_eq!(missing.to_string(), "Not uploaded");

        let failed = UploadStatus {
            uploaded: false,
            last_error: Some(RunError { code: 3, message: "Bad archive".into() }),
        };
        assert_eq!(failed.to_string(), "Upload failure - [3] Bad archive");
    }

    #[test]
    fn test_parse_revision() {
        let json = r#"{
            "id": "5001", "name": "v1", "description": "first", "status": "Running",
            "health": "Ok", "cpu_usage": 1000, "ram_usage": 2048, "tmpfs_size": 512,
            "binaries": {"uploaded": true}, "seeds": {"uploaded": false},
            "config": {"uploaded": true, "last_error": null},
            "image_id": "1", "feedback": {"scheduler": {"code": 0, "message": "Started"}},
            "created": "2026-03-01T10:00:00Z", "last_start_date": "2026-03-01T10:05:00Z",
            "last_stop_date": null, "erasure_date": null
        }"#;
        let revision: Revision = serde_json::from_str(json).unwrap();
        assert_eq!(revision.name, "v1");
        assert!(!revision.is_deleted());
        assert_eq!(
            revision.feedback.unwrap().to_string(),
            "Scheduler: [0] Started"
        );
    }
}
