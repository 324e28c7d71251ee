//! Persisted session state
//!
//! The session record lives in browser-local key/value storage shared by all
//! tabs of a profile. `SessionStorage` mirrors that API so the record store
//! can run against the browser, a webview bridge or memory.

use hireflow_core::SessionRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage shaped like the Web Storage API
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str);
}

/// In-memory storage. Clones share their contents, like tabs sharing one
/// browser profile.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Result of a cross-tab expiry write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCommit {
    /// The new expiry was written
    Advanced,
    /// The stored expiry is already as late or later; nothing written
    Stale,
    /// The stored record belongs to another session or is gone
    SessionChanged,
}

#[derive(Debug, Clone)]
struct StorageKeys {
    token_expiry: String,
    session_id: String,
    last_activity: String,
}

impl StorageKeys {
    fn new(namespace: &str) -> Self {
        Self {
            token_expiry: format!("{namespace}:token_expiry"),
            session_id: format!("{namespace}:session_id"),
            last_activity: format!("{namespace}:last_activity"),
        }
    }
}

/// Namespaced view of the session record in shared storage
#[derive(Clone)]
pub struct SessionRecordStore {
    storage: Arc<dyn SessionStorage>,
    keys: StorageKeys,
}

impl SessionRecordStore {
    pub fn new(storage: Arc<dyn SessionStorage>, namespace: &str) -> Self {
        Self {
            storage,
            keys: StorageKeys::new(namespace),
        }
    }

    /// Read the record; partial or unparseable records read as absent
    pub fn load(&self) -> Option<SessionRecord> {
        let session_id = self.storage.get_item(&self.keys.session_id)?;
        let expiry = self.storage.get_item(&self.keys.token_expiry);
        let activity = self.storage.get_item(&self.keys.last_activity);

        let parsed = expiry
            .as_deref()
            .and_then(|v| v.parse::<i64>().ok())
            .zip(activity.as_deref().and_then(|v| v.parse::<i64>().ok()));

        let Some((token_expiry_ms, last_activity_ms)) = parsed else {
            warn!(
                session_id = %session_id,
                "ignoring incomplete session record in storage"
            );
            return None;
        };

        Some(SessionRecord {
            token_expiry_ms,
            session_id,
            last_activity_ms,
        })
    }

    /// Write a brand new record, replacing whatever was stored
    pub fn establish(&self, record: &SessionRecord) -> Result<(), StorageError> {
        self.storage
            .set_item(&self.keys.token_expiry, &record.token_expiry_ms.to_string())?;
        self.storage
            .set_item(&self.keys.last_activity, &record.last_activity_ms.to_string())?;
        // The session id goes last: `load` keys off it, so a reader never
        // sees a new id next to the previous session's expiry.
        self.storage.set_item(&self.keys.session_id, &record.session_id)
    }

    /// Read-check-write of a refreshed expiry.
    ///
    /// Only writes when the stored record still belongs to `session_id` and
    /// `token_expiry_ms` moves the expiry forward, so a slow response in one
    /// tab never rolls back a newer expiry written by another.
    pub fn commit_expiry(
        &self,
        session_id: &str,
        token_expiry_ms: i64,
    ) -> Result<ExpiryCommit, StorageError> {
        let Some(current) = self.load() else {
            return Ok(ExpiryCommit::SessionChanged);
        };
        if current.session_id != session_id {
            return Ok(ExpiryCommit::SessionChanged);
        }
        if token_expiry_ms <= current.token_expiry_ms {
            return Ok(ExpiryCommit::Stale);
        }
        self.storage
            .set_item(&self.keys.token_expiry, &token_expiry_ms.to_string())?;
        Ok(ExpiryCommit::Advanced)
    }

    /// Record user activity; returns false when there is no session
    pub fn touch(&self, now_ms: i64) -> Result<bool, StorageError> {
        if self.load().is_none() {
            return Ok(false);
        }
        self.storage
            .set_item(&self.keys.last_activity, &now_ms.to_string())?;
        Ok(true)
    }

    pub fn clear(&self) {
        self.storage.remove_item(&self.keys.session_id);
        self.storage.remove_item(&self.keys.token_expiry);
        self.storage.remove_item(&self.keys.last_activity);
    }
}
