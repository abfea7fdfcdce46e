//! Best-effort local persistence for session artifacts.
//!
//! The persisted copy is a short-lived hint for the next startup, never a source of
//! truth: loads that fail simply report nothing, saves that fail only log, and
//! sign-out clears the cache proactively.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::session::Session;

/// Session artifacts written to local storage between runs.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PersistedAuth {
    pub session: Session,
    pub saved_at: DateTime<Utc>,
}

pub trait SessionCache: Send + Sync {
    fn load(&self) -> Option<PersistedAuth>;

    fn save(&self, auth: &PersistedAuth);

    fn clear(&self);
}

/// Process-local cache used when no persistence path is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemorySessionCache {
    slot: Mutex<Option<PersistedAuth>>,
}

impl SessionCache for MemorySessionCache {
    fn load(&self) -> Option<PersistedAuth> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn save(&self, auth: &PersistedAuth) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(auth.clone());
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}

/// JSON-file cache for long-lived installations.
#[derive(Debug)]
pub struct FileSessionCache {
    path: PathBuf,
}

impl FileSessionCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionCache for FileSessionCache {
    fn load(&self) -> Option<PersistedAuth> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!("Failed to read persisted session: {err}");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(auth) => Some(auth),
            Err(err) => {
                tracing::warn!("Discarding corrupt persisted session: {err}");
                let _ = std::fs::remove_file(&self.path);
                None
            }
        }
    }

    fn save(&self, auth: &PersistedAuth) {
        let bytes = match serde_json::to_vec(auth) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!("Failed to serialize session for persistence: {err}");
                return;
            }
        };

        if let Err(err) = std::fs::write(&self.path, bytes) {
            tracing::warn!("Failed to persist session: {err}");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("Failed to clear persisted session: {err}"),
        }
    }
}
