//! Open participant sockets per session
//!
//! A participant may follow a session from several sockets at once. Presence
//! is cleared only when the last of them closes.

use std::collections::HashMap;
use std::sync::Arc;

use tabshare_core::{PresenceTracker, SessionError};
use tokio::sync::Mutex;
use tracing::debug;

type ConnectionKey = (String, String);

/// Counts live sockets per (session, participant)
pub struct ConnectionRegistry {
    presence: Arc<PresenceTracker>,
    open: Mutex<HashMap<ConnectionKey, usize>>,
}

impl ConnectionRegistry {
    pub fn new(presence: Arc<PresenceTracker>) -> Self {
        Self {
            presence,
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Record a newly opened socket
    pub async fn attach(&self, session_id: &str, participant_id: &str) {
        let mut open = self.open.lock().await;
        *open.entry(key(session_id, participant_id)).or_insert(0) += 1;
    }

    /// Record a closed socket, clearing presence if it was the last one
    ///
    /// Returns whether presence was cleared. The registry stays locked until
    /// the presence write finishes, so a socket opened meanwhile cannot be
    /// counted against a participant that is about to be removed.
    pub async fn detach(&self, session_id: &str, participant_id: &str) -> Result<bool, SessionError> {
        let mut open = self.open.lock().await;
        let key = key(session_id, participant_id);

        let remaining = match open.get_mut(&key) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining > 0 {
            debug!(session_id, participant_id, remaining, "participant still connected");
            return Ok(false);
        }

        open.remove(&key);
        self.presence.disconnect(session_id, participant_id).await?;
        Ok(true)
    }

    /// Sockets currently open for a participant
    pub async fn open_connections(&self, session_id: &str, participant_id: &str) -> usize {
        self.open
            .lock()
            .await
            .get(&key(session_id, participant_id))
            .copied()
            .unwrap_or(0)
    }
}

fn key(session_id: &str, participant_id: &str) -> ConnectionKey {
    (session_id.to_string(), participant_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabshare_core::{MemorySessionStore, SessionLifecycleManager, SessionStore};

    async fn setup() -> (ConnectionRegistry, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        SessionLifecycleManager::new(store.clone())
            .create("s1")
            .await
            .unwrap();
        let presence = Arc::new(PresenceTracker::new(store.clone()));
        presence.join("s1", "u1", "Ana").await.unwrap();
        (ConnectionRegistry::new(presence), store)
    }

    #[tokio::test]
    async fn last_socket_clears_presence() {
        let (registry, store) = setup().await;
        registry.attach("s1", "u1").await;
        registry.attach("s1", "u1").await;

        assert!(!registry.detach("s1", "u1").await.unwrap());
        assert!(store.get("s1").await.unwrap().is_active("u1"));
        assert_eq!(registry.open_connections("s1", "u1").await, 1);

        assert!(registry.detach("s1", "u1").await.unwrap());
        assert!(!store.get("s1").await.unwrap().is_active("u1"));
        assert_eq!(registry.open_connections("s1", "u1").await, 0);
    }

    #[tokio::test]
    async fn sockets_are_counted_per_session() {
        let (registry, store) = setup().await;
        registry.attach("s1", "u1").await;
        registry.attach("s2", "u1").await;

        assert!(registry.detach("s1", "u1").await.unwrap());

        assert!(!store.get("s1").await.unwrap().is_active("u1"));
        assert_eq!(registry.open_connections("s2", "u1").await, 1);
    }
}
