//! In-memory SessionStore implementation
//!
//! MemorySessionStore keeps documents in a HashMap and uses one broadcast
//! channel per watched document for live subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

use super::subscription::{WatchRelease, WatcherMap, lock_watchers};
use super::{FieldUpdate, SessionStore, SessionSubscription};
use crate::error::StoreError;
use crate::session::Session;

/// Default broadcast capacity per watched document
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// In-memory implementation of SessionStore
///
/// Pushes are sent while the document write lock is held, so every
/// subscriber sees writes to one document in the order they were applied.
/// Lock order is always `documents` then `watchers`.
pub struct MemorySessionStore {
    /// Stored documents by session id
    documents: RwLock<HashMap<String, Session>>,
    /// Broadcast senders for watched documents; an entry lives only while
    /// it has receivers
    watchers: Arc<WatcherMap>,
    /// Capacity for newly created watch channels
    capacity: usize,
}

impl MemorySessionStore {
    /// Create an empty store with the given per-document channel capacity
    pub fn new(capacity: usize) -> Self {
        Self::with_sessions(capacity, Vec::new())
    }

    /// Create a store pre-populated with documents
    pub fn with_sessions(capacity: usize, sessions: Vec<Session>) -> Self {
        let documents = sessions.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self {
            documents: RwLock::new(documents),
            watchers: Arc::new(WatcherMap::default()),
            capacity: capacity.max(1),
        }
    }

    /// Copy of every stored document, ordered by id
    pub async fn snapshot(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.documents.read().await.values().cloned().collect();
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        sessions
    }

    /// Number of stored documents
    pub async fn session_count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Live subscribers currently attached to a document
    pub fn watcher_count(&self, session_id: &str) -> usize {
        lock_watchers(&self.watchers)
            .get(session_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Documents that currently have a broadcast channel
    pub fn watched_documents(&self) -> usize {
        lock_watchers(&self.watchers).len()
    }

    /// Push a committed document to its watchers
    ///
    /// Must be called with the documents write lock held.
    fn notify(&self, session: &Session) {
        let mut watchers = lock_watchers(&self.watchers);
        if let Some(tx) = watchers.get(&session.id) {
            match tx.send(Arc::new(session.clone())) {
                Ok(count) => trace!(session_id = %session.id, "pushed to {} watchers", count),
                Err(_) => {
                    // Every receiver was dropped
                    watchers.remove(&session.id);
                }
            }
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Session, StoreError> {
        self.documents
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))
    }

    async fn set(&self, session_id: &str, mut session: Session) -> Result<(), StoreError> {
        session.id = session_id.to_string();

        let mut documents = self.documents.write().await;
        documents.insert(session_id.to_string(), session.clone());
        self.notify(&session);
        Ok(())
    }

    async fn update(
        &self,
        session_id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, StoreError> {
        let mut documents = self.documents.write().await;
        let current = documents
            .get(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;

        let next = FieldUpdate::apply_all(current, &updates)?;
        documents.insert(session_id.to_string(), next.clone());
        self.notify(&next);
        Ok(next)
    }

    async fn subscribe(&self, session_id: &str) -> Result<SessionSubscription, StoreError> {
        let documents = self.documents.read().await;
        let rx = {
            let mut watchers = lock_watchers(&self.watchers);
            watchers
                .entry(session_id.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };
        let initial = documents
            .get(session_id)
            .cloned()
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()));

        let release = WatchRelease::new(&self.watchers, session_id);
        Ok(SessionSubscription::new(session_id, initial, rx, release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Item;

    fn seeded_store() -> MemorySessionStore {
        let mut session = Session::new("s1");
        session.items = vec![Item::new("i1", "Pizza", 20.0, 1)];
        MemorySessionStore::with_sessions(16, vec![session])
    }

    // ==================== Get / Set Tests ====================

    #[tokio::test]
    async fn get_missing_session_returns_not_found() {
        let store = MemorySessionStore::default();

        let result = store.get("nope").await;

        assert!(matches!(result, Err(StoreError::SessionNotFound(id)) if id == "nope"));
    }

    #[tokio::test]
    async fn set_overwrites_and_forces_id() {
        let store = seeded_store();

        store.set("s1", Session::new("other")).await.unwrap();

        let session = store.get("s1").await.unwrap();
        assert_eq!(session.id, "s1");
        assert!(session.items.is_empty());
        assert_eq!(store.session_count().await, 1);
    }

    // ==================== Update Tests ====================

    #[tokio::test]
    async fn update_missing_session_fails() {
        let store = MemorySessionStore::default();

        let result = store
            .update("nope", vec![FieldUpdate::SetAlias("x".into())])
            .await;

        assert!(matches!(result, Err(StoreError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn failed_update_leaves_document_untouched() {
        let store = seeded_store();

        let result = store
            .update(
                "s1",
                vec![
                    FieldUpdate::SetAlias("Friday".into()),
                    FieldUpdate::ToggleBuyer {
                        item_id: "missing".into(),
                        participant_id: "u1".into(),
                    },
                ],
            )
            .await;

        assert!(matches!(result, Err(StoreError::ItemNotFound { .. })));
        assert!(store.get("s1").await.unwrap().alias.is_empty());
    }

    // ==================== Subscribe Tests ====================

    #[tokio::test]
    async fn subscribe_delivers_current_document_first() {
        let store = seeded_store();
        let mut sub = store.subscribe("s1").await.unwrap();

        let first = sub.next().await.unwrap().unwrap();

        assert_eq!(first.items.len(), 1);
    }

    #[tokio::test]
    async fn subscribe_receives_writes_in_order() {
        let store = seeded_store();
        let mut sub = store.subscribe("s1").await.unwrap();
        let _ = sub.next().await;

        store
            .update("s1", vec![FieldUpdate::SetAlias("one".into())])
            .await
            .unwrap();
        store
            .update("s1", vec![FieldUpdate::SetAlias("two".into())])
            .await
            .unwrap();

        assert_eq!(sub.next().await.unwrap().unwrap().alias, "one");
        assert_eq!(sub.next().await.unwrap().unwrap().alias, "two");
    }

    #[tokio::test]
    async fn subscribe_to_missing_session_reports_then_sees_creation() {
        let store = MemorySessionStore::default();
        let mut sub = store.subscribe("later").await.unwrap();

        assert!(matches!(
            sub.next().await,
            Some(Err(StoreError::SessionNotFound(_)))
        ));

        store.set("later", Session::new("later")).await.unwrap();

        let created = sub.next().await.unwrap().unwrap();
        assert_eq!(created.id, "later");
    }

    #[tokio::test]
    async fn dropping_subscription_releases_watcher() {
        let store = seeded_store();
        let sub = store.subscribe("s1").await.unwrap();
        assert_eq!(store.watcher_count("s1"), 1);

        drop(sub);

        assert_eq!(store.watcher_count("s1"), 0);
        assert_eq!(store.watched_documents(), 0);
        store.set("s1", Session::new("s1")).await.unwrap();
    }

    #[tokio::test]
    async fn channel_survives_until_last_subscriber_drops() {
        let store = seeded_store();
        let first = store.subscribe("s1").await.unwrap();
        let mut second = store.subscribe("s1").await.unwrap();
        let _ = second.next().await;

        drop(first);
        assert_eq!(store.watched_documents(), 1);

        store
            .update("s1", vec![FieldUpdate::SetAlias("still here".into())])
            .await
            .unwrap();
        assert_eq!(second.next().await.unwrap().unwrap().alias, "still here");

        drop(second);
        assert_eq!(store.watched_documents(), 0);
    }

    #[tokio::test]
    async fn subscriptions_to_unknown_sessions_leave_no_channels() {
        let store = MemorySessionStore::default();

        for n in 0..100 {
            let sub = store.subscribe(&format!("ghost{}", n)).await.unwrap();
            drop(sub);
        }

        assert_eq!(store.watched_documents(), 0);
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_to_latest() {
        let store = MemorySessionStore::with_sessions(2, vec![Session::new("s1")]);
        let mut sub = store.subscribe("s1").await.unwrap();
        let _ = sub.next().await;

        for n in 0..5 {
            store
                .update("s1", vec![FieldUpdate::SetAlias(format!("v{}", n))])
                .await
                .unwrap();
        }

        assert_eq!(sub.next().await.unwrap().unwrap().alias, "v4");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_document() {
        let store = seeded_store();
        let mut a = store.subscribe("s1").await.unwrap();
        let mut b = store.subscribe("s1").await.unwrap();
        let _ = a.next().await;
        let _ = b.next().await;

        store
            .update("s1", vec![FieldUpdate::SetAlias("shared".into())])
            .await
            .unwrap();

        assert_eq!(a.next().await.unwrap().unwrap().alias, "shared");
        assert_eq!(b.next().await.unwrap().unwrap().alias, "shared");
    }
}
