//! JSON-file backed SessionStore

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::memory::MemorySessionStore;
use super::{FieldUpdate, SessionStore, SessionSubscription};
use crate::error::StoreError;
use crate::session::Session;

/// Sessions file name
pub const SESSIONS_FILE: &str = "sessions.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionsFile {
    #[serde(default)]
    sessions: Vec<Session>,
}

/// Durable store: documents live in memory and are written to a JSON file
/// on every mutation.
///
/// The file is written before the change is committed in memory. When the
/// write fails the document stays as it was and no subscriber sees a push.
pub struct JsonFileSessionStore {
    inner: MemorySessionStore,
    file_path: PathBuf,
    /// Serializes mutations from read through commit
    write_lock: Mutex<()>,
}

impl JsonFileSessionStore {
    /// Load sessions from `path`, or start empty if the file does not exist
    pub async fn load(path: impl AsRef<Path>, capacity: usize) -> Result<Self, StoreError> {
        let file_path = path.as_ref().to_path_buf();

        let sessions = if fs::try_exists(&file_path).await? {
            let content = fs::read_to_string(&file_path).await?;
            let file: SessionsFile = serde_json::from_str(&content)?;
            debug!(
                path = %file_path.display(),
                "loaded {} sessions", file.sessions.len()
            );
            file.sessions
        } else {
            Vec::new()
        };

        Ok(Self {
            inner: MemorySessionStore::with_sessions(capacity, sessions),
            file_path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Write every stored document, with `next` in place of its current version
    ///
    /// Must be called with the write lock held.
    async fn persist_with(&self, next: &Session) -> Result<(), StoreError> {
        let mut sessions = self.inner.snapshot().await;
        match sessions.iter_mut().find(|s| s.id == next.id) {
            Some(slot) => *slot = next.clone(),
            None => {
                sessions.push(next.clone());
                sessions.sort_by(|a, b| a.id.cmp(&b.id));
            }
        }
        let file = SessionsFile { sessions };

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(&file)?;
        fs::write(&self.file_path, content).await.map_err(|e| {
            warn!(path = %self.file_path.display(), "failed to persist sessions: {}", e);
            StoreError::Io(e)
        })
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.inner.get(session_id).await
    }

    async fn set(&self, session_id: &str, mut session: Session) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        session.id = session_id.to_string();

        self.persist_with(&session).await?;
        self.inner.set(session_id, session).await
    }

    async fn update(
        &self,
        session_id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = self.inner.get(session_id).await?;
        let next = FieldUpdate::apply_all(&current, &updates)?;

        self.persist_with(&next).await?;
        self.inner.set(session_id, next.clone()).await?;
        Ok(next)
    }

    async fn subscribe(&self, session_id: &str) -> Result<SessionSubscription, StoreError> {
        self.inner.subscribe(session_id).await
    }
}
