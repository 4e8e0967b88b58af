//! Field-scoped updates
//!
//! Each variant names one field path in the session document together with
//! the operation applied to it: set, delete of a map key, array union,
//! array remove, or an in-place flip.

use crate::error::StoreError;
use crate::session::{Item, ParticipantId, Session, TotalInfo};

/// A single partial update to a session document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// `activeUsers.<participant_id> = display_name`
    SetActiveUser {
        participant_id: ParticipantId,
        display_name: String,
    },
    /// Delete `activeUsers.<participant_id>`
    DeleteActiveUser { participant_id: ParticipantId },
    /// Array-union into `items[item_id].buyers`
    UnionBuyers {
        item_id: String,
        participant_ids: Vec<ParticipantId>,
    },
    /// Array-remove from `items[item_id].buyers`
    RemoveBuyers {
        item_id: String,
        participant_ids: Vec<ParticipantId>,
    },
    /// Flip one participant in `items[item_id].buyers`
    ToggleBuyer {
        item_id: String,
        participant_id: ParticipantId,
    },
    /// Array-remove from the buyers of every item
    RemoveBuyerEverywhere { participant_id: ParticipantId },
    /// `alias = value`
    SetAlias(String),
    /// `totalInfo = value`
    SetTotalInfo(TotalInfo),
    /// `items = value`
    SetItems(Vec<Item>),
}

impl FieldUpdate {
    /// Apply to a document in place
    pub fn apply(&self, session: &mut Session) -> Result<(), StoreError> {
        match self {
            FieldUpdate::SetActiveUser {
                participant_id,
                display_name,
            } => {
                session
                    .active_users
                    .insert(participant_id.clone(), display_name.clone());
            }
            FieldUpdate::DeleteActiveUser { participant_id } => {
                session.active_users.remove(participant_id);
            }
            FieldUpdate::UnionBuyers {
                item_id,
                participant_ids,
            } => {
                let item = item_mut(session, item_id)?;
                for id in participant_ids {
                    item.add_buyer(id);
                }
            }
            FieldUpdate::RemoveBuyers {
                item_id,
                participant_ids,
            } => {
                let item = item_mut(session, item_id)?;
                for id in participant_ids {
                    item.remove_buyer(id);
                }
            }
            FieldUpdate::ToggleBuyer {
                item_id,
                participant_id,
            } => {
                item_mut(session, item_id)?.toggle_buyer(participant_id);
            }
            FieldUpdate::RemoveBuyerEverywhere { participant_id } => {
                session.detach_buyer(participant_id);
            }
            FieldUpdate::SetAlias(alias) => session.alias = alias.clone(),
            FieldUpdate::SetTotalInfo(totals) => session.total_info = *totals,
            FieldUpdate::SetItems(items) => session.items = items.clone(),
        }
        Ok(())
    }

    /// Apply a batch to a copy, returning it only if every update succeeded
    pub fn apply_all(session: &Session, updates: &[FieldUpdate]) -> Result<Session, StoreError> {
        let mut next = session.clone();
        for update in updates {
            update.apply(&mut next)?;
        }
        Ok(next)
    }
}

fn item_mut<'a>(session: &'a mut Session, item_id: &str) -> Result<&'a mut Item, StoreError> {
    let session_id = session.id.clone();
    session
        .item_mut(item_id)
        .ok_or_else(|| StoreError::ItemNotFound {
            session_id,
            item_id: item_id.to_string(),
        })
}
