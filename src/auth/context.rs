//! Persisted login state.
//!
//! The handle is read from disk once at construction and then lives behind
//! an RwLock. Writes go to disk before the lock releases, so a crash after
//! `set` returns never loses the session.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

/// Everything the client needs to act on behalf of a logged-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub session_token: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    current: RwLock<Option<SessionHandle>>,
}

impl SessionContext {
    /// Loads the persisted handle if one exists. A missing or unreadable
    /// file starts the context logged out rather than failing.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable session file {}: {}",
                        path.display(),
                        e
                    );
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Option<SessionHandle> {
        self.current.read().unwrap().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    /// Replaces the handle and persists it.
    pub fn set(&self, handle: SessionHandle) -> Result<(), io::Error> {
        let mut current = self.current.write().unwrap();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&handle)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;
        *current = Some(handle);
        Ok(())
    }

    /// Wipes the handle. Removal of the file is best effort; the in-memory
    /// state always clears.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap();
        *current = None;
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                tracing::warn!("Could not remove session file {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_handle() -> SessionHandle {
        SessionHandle {
            session_token: "aa".repeat(32),
            user_id: 7,
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn test_starts_logged_out() {
        let dir = TempDir::new().unwrap();
        let context = SessionContext::load(dir.path().join("session.json"));

        assert!(!context.is_logged_in());
        assert!(context.current().is_none());
    }

    #[test]
    fn test_set_current_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let context = SessionContext::load(&path);

        context.set(sample_handle()).unwrap();
        assert!(context.is_logged_in());
        assert_eq!(context.current().unwrap().username, "jdoe");
        assert!(path.exists());

        context.clear();
        assert!(!context.is_logged_in());
        assert!(!path.exists());
    }

    #[test]
    fn test_handle_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let first = SessionContext::load(&path);
        first.set(sample_handle()).unwrap();
        drop(first);

        let second = SessionContext::load(&path);
        assert_eq!(second.current(), Some(sample_handle()));
    }

    #[test]
    fn test_corrupt_file_loads_logged_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let context = SessionContext::load(&path);
        assert!(context.current().is_none());
    }

    #[test]
    fn test_clear_without_file_is_quiet() {
        let dir = TempDir::new().unwrap();
        let context = SessionContext::load(dir.path().join("session.json"));

        context.clear();
        assert!(!context.is_logged_in());
    }
}
