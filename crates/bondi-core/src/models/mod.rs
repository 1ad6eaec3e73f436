//! Data models for Bondifuzz entities.
//!
//! This module contains the data structures returned by and sent to the API
//! server:
//!
//! - `User`: accounts, as seen by administrators
//! - `Project`, `Pool`: projects and their resource pools
//! - `Fuzzer`: fuzzers inside a project
//! - `Revision`: uploaded builds of a fuzzer
//! - `Crash`: crashes found by a fuzzer
//! - `UserPool`: a user's resource pools
//! - `FuzzerConfigurations`: supported language/engine combinations

pub mod crash;
pub mod fuzzer;
pub mod meta;
pub mod pool;
pub mod project;
pub mod revision;
pub mod user;

use serde::{Deserialize, Serialize};

pub use crash::Crash;
pub use fuzzer::{CreatedFuzzer, Fuzzer, NewFuzzer};
pub use meta::FuzzerConfigurations;
pub use project::{
    CreatedProject, FuzzerLimits, NewPool, NewProject, NodeGroup, Pool, PoolResources, PoolStatus,
    Project, ProjectUpdate, ResourceLimits,
};
pub use pool::{PoolCapacity, UserPool};
pub use revision::{Revision, RevisionAction, RunError, RunFeedback, UploadStatus};
pub use user::{CreatedUser, NewUser, User, UserUpdate};

/// Text sent when the user leaves a description empty.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// How `DELETE` treats an entity: move to the trash bin, take it back out,
/// or remove it for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAction {
    Delete,
    Restore,
    Erase,
}

impl DeleteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteAction::Delete => "delete",
            DeleteAction::Restore => "restore",
            DeleteAction::Erase => "erase",
        }
    }
}

/// Server-assigned identifiers are decimal numbers; anything else is a name.
pub fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Description to send for an optional user-supplied one.
pub fn description_or_default(description: Option<&str>) -> String {
    match description.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}

/// Shorten long text for table cells, on a char boundary.
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("12345"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("my-project"));
        assert!(!is_identifier("123abc"));
    }

    #[test]
    fn test_description_or_default() {
        assert_eq!(description_or_default(None), DEFAULT_DESCRIPTION);
        assert_eq!(description_or_default(Some("  ")), DEFAULT_DESCRIPTION);
        assert_eq!(description_or_default(Some(" libpng ")), "libpng");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("a much longer description", 10), "a much ...");
        assert_eq!(shorten("ééééééé", 5), "éé...");
    }

    #[test]
    fn test_delete_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DeleteAction::Erase).unwrap(), "\"erase\"");
        assert_eq!(DeleteAction::Restore.as_str(), "restore");
    }
}
