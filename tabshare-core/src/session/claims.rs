//! Item claim engine
//!
//! Each (item, participant) pair is either claimed or unclaimed, and
//! [`ClaimEngine::toggle_claim`] flips it. How the flip reaches the store
//! depends on [`ClaimStrategy`]:
//!
//! - `Atomic` sends a field-scoped toggle that the store applies under its
//!   own write lock. Concurrent claims on the same item all survive.
//! - `Overwrite` reads the whole document, flips the claim locally and
//!   writes the whole document back. Two participants claiming the same
//!   unclaimed item at the same moment can both read an empty buyer list,
//!   and the second write then erases the first claim. This mirrors how the
//!   browser client originally behaved and is kept for compatibility only.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Item, require_participant, require_session_id};
use crate::error::SessionError;
use crate::store::{FieldUpdate, SessionStore};

/// How claim toggles are written to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStrategy {
    /// Field-scoped toggle, applied atomically by the store
    #[default]
    Atomic,
    /// Whole-document read-modify-write; loses updates under contention
    Overwrite,
}

impl std::str::FromStr for ClaimStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atomic" => Ok(Self::Atomic),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!("unknown claim strategy: {}", other)),
        }
    }
}

/// Mutates item buyer lists on behalf of participants
pub struct ClaimEngine {
    store: Arc<dyn SessionStore>,
    strategy: ClaimStrategy,
}

impl ClaimEngine {
    pub fn new(store: Arc<dyn SessionStore>, strategy: ClaimStrategy) -> Self {
        Self { store, strategy }
    }

    pub fn strategy(&self) -> ClaimStrategy {
        self.strategy
    }

    /// Flip a participant's claim on an item and return the updated item
    ///
    /// `participant_id` is `None` when the caller has no identity yet; the
    /// call is rejected without touching the store.
    pub async fn toggle_claim(
        &self,
        session_id: &str,
        item_id: &str,
        participant_id: Option<&str>,
    ) -> Result<Item, SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(participant_id)?;

        let item = match self.strategy {
            ClaimStrategy::Atomic => {
                self.apply(
                    session_id,
                    item_id,
                    FieldUpdate::ToggleBuyer {
                        item_id: item_id.to_string(),
                        participant_id: participant_id.to_string(),
                    },
                )
                .await?
            }
            ClaimStrategy::Overwrite => {
                self.toggle_by_overwrite(session_id, item_id, participant_id)
                    .await?
            }
        };

        debug!(
            session_id,
            item_id,
            participant_id,
            claimed = item.has_buyer(participant_id),
            "claim toggled"
        );
        Ok(item)
    }

    /// Ensure the participant is a buyer; a no-op if already claimed
    pub async fn claim(
        &self,
        session_id: &str,
        item_id: &str,
        participant_id: Option<&str>,
    ) -> Result<Item, SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(participant_id)?;
        self.apply(
            session_id,
            item_id,
            FieldUpdate::UnionBuyers {
                item_id: item_id.to_string(),
                participant_ids: vec![participant_id.to_string()],
            },
        )
        .await
    }

    /// Ensure the participant is not a buyer; a no-op if not claimed
    pub async fn unclaim(
        &self,
        session_id: &str,
        item_id: &str,
        participant_id: Option<&str>,
    ) -> Result<Item, SessionError> {
        require_session_id(session_id)?;
        let participant_id = require_participant(participant_id)?;
        self.apply(
            session_id,
            item_id,
            FieldUpdate::RemoveBuyers {
                item_id: item_id.to_string(),
                participant_ids: vec![participant_id.to_string()],
            },
        )
        .await
    }

    async fn apply(
        &self,
        session_id: &str,
        item_id: &str,
        update: FieldUpdate,
    ) -> Result<Item, SessionError> {
        let session = self.store.update(session_id, vec![update]).await?;
        session
            .item(item_id)
            .cloned()
            .ok_or_else(|| item_not_found(session_id, item_id))
    }

    async fn toggle_by_overwrite(
        &self,
        session_id: &str,
        item_id: &str,
        participant_id: &str,
    ) -> Result<Item, SessionError> {
        let mut session = self.store.get(session_id).await?;
        if session.toggle_claim(item_id, participant_id).is_none() {
            return Err(item_not_found(session_id, item_id));
        }

        let item = session
            .item(item_id)
            .cloned()
            .ok_or_else(|| item_not_found(session_id, item_id))?;
        self.store.set(session_id, session).await?;
        Ok(item)
    }
}

fn item_not_found(session_id: &str, item_id: &str) -> SessionError {
    SessionError::ItemNotFound {
        session_id: session_id.to_string(),
        item_id: item_id.to_string(),
    }
}
