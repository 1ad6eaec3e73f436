use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session file name in the app directory
const SESSION_FILE: &str = "session.json";

/// Identity and tokens obtained from one successful login.
///
/// A session is either absent or complete: it is replaced as a whole on
/// re-authentication and never updated field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(alias = "session_id")]
    pub session_token: String,
    pub display_name: String,
    pub user_name: String,
    pub is_admin: bool,
}

/// Durable storage for the session between process invocations.
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` means nobody has logged in yet.
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session persisted as JSON in the app directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(app_dir: &Path) -> Self {
        Self {
            path: app_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read session file")?;
        let session: Session =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents).context("Failed to write session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// In-process store, for tests and for callers that do not want persistence.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// The currently stored session.
    pub fn stored(&self) -> Option<Session> {
        self.session.lock().map(|s| s.clone()).unwrap_or(None)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.stored())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut stored = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *stored = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut stored = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *stored = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: "1001".into(),
            session_token: "tok".into(),
            display_name: "Alice A.".into(),
            user_name: "alice".into(),
            is_admin: false,
        }
    }

    #[test]
    fn test_file_store_absent_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
        // Clearing a missing file is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(&dir.path().join("bondi"));

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupted_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        std::fs::write(store.path(), r#"{"user_id": "1"}"#).unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_session_accepts_legacy_field_name() {
        let json = r#"{"user_id": "7", "session_id": "abc", "display_name": "D", "user_name": "d", "is_admin": true}"#;
        let parsed: Session = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.session_token, "abc");
        assert!(parsed.is_admin);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&session()).unwrap();
        assert_eq!(store.stored(), Some(session()));
        store.clear().unwrap();
        assert_eq!(store.stored(), None);
    }
}
