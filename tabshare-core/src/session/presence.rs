//! Presence tracking
//!
//! Maintains `activeUsers` for a session. Joining is a map-key set, leaving
//! deletes the key and detaches the participant's claims in the same atomic
//! update so a departed participant is never billed.

use std::sync::Arc;

use tracing::debug;

use super::{Participant, require_participant, require_session_id};
use crate::error::SessionError;
use crate::store::{FieldUpdate, SessionStore};

/// Tracks which participants are active in a session
pub struct PresenceTracker {
    store: Arc<dyn SessionStore>,
}

impl PresenceTracker {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Register a participant; repeated joins just overwrite the name
    pub async fn join(
        &self,
        session_id: &str,
        participant_id: &str,
        display_name: &str,
    ) -> Result<(), SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(Some(participant_id))?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(SessionError::InvalidArgument(
                "please enter your name".to_string(),
            ));
        }

        self.store
            .update(
                session_id,
                vec![FieldUpdate::SetActiveUser {
                    participant_id: participant_id.to_string(),
                    display_name: display_name.to_string(),
                }],
            )
            .await?;

        debug!(session_id, participant_id, "participant joined");
        Ok(())
    }

    /// Remove a participant and every claim they hold
    pub async fn leave(&self, session_id: &str, participant_id: &str) -> Result<(), SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(Some(participant_id))?;

        self.store
            .update(
                session_id,
                vec![
                    FieldUpdate::RemoveBuyerEverywhere {
                        participant_id: participant_id.to_string(),
                    },
                    FieldUpdate::DeleteActiveUser {
                        participant_id: participant_id.to_string(),
                    },
                ],
            )
            .await?;

        debug!(session_id, participant_id, "participant left");
        Ok(())
    }

    /// Transport-level disconnect: drop presence but keep claims, so a
    /// reconnecting participant finds their items where they left them
    pub async fn disconnect(
        &self,
        session_id: &str,
        participant_id: &str,
    ) -> Result<(), SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(Some(participant_id))?;

        self.store
            .update(
                session_id,
                vec![FieldUpdate::DeleteActiveUser {
                    participant_id: participant_id.to_string(),
                }],
            )
            .await?;

        debug!(session_id, participant_id, "participant disconnected");
        Ok(())
    }

    /// Currently active participants, ordered by id
    pub async fn active_participants(
        &self,
        session_id: &str,
    ) -> Result<Vec<Participant>, SessionError> {
        require_session_id(session_id)?;
        Ok(self.store.get(session_id).await?.participants())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Item, Session};
    use crate::store::MemorySessionStore;

    async fn create_test_tracker() -> (PresenceTracker, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::default());
        let mut session = Session::new("s1");
        session.items = vec![
            Item::new("i1", "Pizza", 20.0, 1),
            Item::new("i2", "Salad", 9.0, 1),
        ];
        store.set("s1", session).await.unwrap();
        (PresenceTracker::new(store.clone()), store)
    }

    #[tokio::test]
    async fn join_registers_participant() {
        let (tracker, _store) = create_test_tracker().await;

        tracker.join("s1", "u1", " Ana ").await.unwrap();

        let participants = tracker.active_participants("s1").await.unwrap();
        assert_eq!(participants, vec![Participant::new("u1", "Ana")]);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let (tracker, store) = create_test_tracker().await;

        tracker.join("s1", "u1", "Ana").await.unwrap();
        tracker.join("s1", "u1", "Ana B").await.unwrap();

        let session = store.get("s1").await.unwrap();
        assert_eq!(session.active_users.len(), 1);
        assert_eq!(session.active_users["u1"], "Ana B");
    }

    #[tokio::test]
    async fn join_requires_identity_and_name() {
        let (tracker, _store) = create_test_tracker().await;

        assert!(matches!(
            tracker.join("s1", "", "Ana").await,
            Err(SessionError::PreconditionFailed(_))
        ));
        assert!(matches!(
            tracker.join("s1", "u1", "   ").await,
            Err(SessionError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn join_missing_session_is_not_found() {
        let (tracker, _store) = create_test_tracker().await;

        let result = tracker.join("ghost", "u1", "Ana").await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn leave_removes_presence_and_claims() {
        let (tracker, store) = create_test_tracker().await;
        tracker.join("s1", "u1", "Ana").await.unwrap();
        tracker.join("s1", "u2", "Ben").await.unwrap();
        store
            .update(
                "s1",
                vec![
                    FieldUpdate::UnionBuyers {
                        item_id: "i1".into(),
                        participant_ids: vec!["u1".into(), "u2".into()],
                    },
                    FieldUpdate::UnionBuyers {
                        item_id: "i2".into(),
                        participant_ids: vec!["u1".into()],
                    },
                ],
            )
            .await
            .unwrap();

        tracker.leave("s1", "u1").await.unwrap();

        let session = store.get("s1").await.unwrap();
        assert!(!session.active_users.contains_key("u1"));
        assert_eq!(session.item("i1").unwrap().buyers, vec!["u2"]);
        assert!(session.item("i2").unwrap().buyers.is_empty());
        assert!(session.active_users.contains_key("u2"));
    }

    #[tokio::test]
    async fn leave_is_a_single_push() {
        let (tracker, store) = create_test_tracker().await;
        tracker.join("s1", "u1", "Ana").await.unwrap();
        store
            .update(
                "s1",
                vec![FieldUpdate::UnionBuyers {
                    item_id: "i1".into(),
                    participant_ids: vec!["u1".into()],
                }],
            )
            .await
            .unwrap();
        let mut sub = store.subscribe("s1").await.unwrap();
        let _ = sub.next().await;

        tracker.leave("s1", "u1").await.unwrap();

        // No intermediate document where u1 is gone but still billed
        let pushed = sub.next().await.unwrap().unwrap();
        assert!(!pushed.is_active("u1"));
        assert!(!pushed.item("i1").unwrap().has_buyer("u1"));
    }

    #[tokio::test]
    async fn disconnect_keeps_claims() {
        let (tracker, store) = create_test_tracker().await;
        tracker.join("s1", "u1", "Ana").await.unwrap();
        store
            .update(
                "s1",
                vec![FieldUpdate::UnionBuyers {
                    item_id: "i1".into(),
                    participant_ids: vec!["u1".into()],
                }],
            )
            .await
            .unwrap();

        tracker.disconnect("s1", "u1").await.unwrap();

        let session = store.get("s1").await.unwrap();
        assert!(!session.is_active("u1"));
        assert!(session.item("i1").unwrap().has_buyer("u1"));
    }
}
