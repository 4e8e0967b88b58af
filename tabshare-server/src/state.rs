//! Shared application state for the tabshare server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tabshare_core::{
    ClaimEngine, ClaimStrategy, MemorySessionStore, PresenceTracker, SessionLifecycleManager,
    SessionStore,
};

use crate::ws::ConnectionRegistry;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backing document store
    pub store: Arc<dyn SessionStore>,
    /// Session creation and bill ingestion
    pub lifecycle: Arc<SessionLifecycleManager>,
    /// Active-participant map
    pub presence: Arc<PresenceTracker>,
    /// Item claims
    pub claims: Arc<ClaimEngine>,
    /// Open sockets per participant
    pub connections: Arc<ConnectionRegistry>,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// In-memory store with atomic claims
    pub fn new() -> Self {
        Self::with_store(
            Arc::new(MemorySessionStore::default()),
            ClaimStrategy::default(),
        )
    }

    /// Build every component over the given store
    pub fn with_store(store: Arc<dyn SessionStore>, strategy: ClaimStrategy) -> Self {
        let presence = Arc::new(PresenceTracker::new(store.clone()));
        Self {
            lifecycle: Arc::new(SessionLifecycleManager::new(store.clone())),
            connections: Arc::new(ConnectionRegistry::new(presence.clone())),
            presence,
            claims: Arc::new(ClaimEngine::new(store.clone(), strategy)),
            store,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_new() {
        let state = AppState::new();
        assert!(state.uptime_seconds() >= 0);
        assert_eq!(state.claims.strategy(), ClaimStrategy::Atomic);
    }

    #[tokio::test]
    async fn test_components_share_one_store() {
        let store = Arc::new(MemorySessionStore::default());
        let state = AppState::with_store(store.clone(), ClaimStrategy::Overwrite);

        state.lifecycle.create("s1").await.unwrap();

        assert_eq!(store.session_count().await, 1);
        assert_eq!(state.claims.strategy(), ClaimStrategy::Overwrite);
    }
}
