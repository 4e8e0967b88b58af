//! Settlement calculation
//!
//! Pure functions over a session snapshot. Nothing here is cached: callers
//! recompute on every pushed document.
//!
//! A claimant's item share is `price × quantity / |buyers|` for each item
//! they claimed. Tax and tip are split in proportion to that claimed
//! subtotal over the full session subtotal (every item, claimed or not).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::{ParticipantId, Session, TotalInfo};

/// What one participant owes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub participant_id: ParticipantId,
    /// Display name if the participant is currently active
    pub display_name: Option<String>,
    pub items_subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

impl ParticipantShare {
    fn zero(participant_id: &str) -> Self {
        Self {
            participant_id: participant_id.to_string(),
            display_name: None,
            items_subtotal: 0.0,
            tax: 0.0,
            tip: 0.0,
            total: 0.0,
        }
    }
}

/// Breakdown of a whole session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub session_id: String,
    /// One entry per claimant, ordered by participant id
    pub shares: Vec<ParticipantShare>,
    pub session_subtotal: f64,
    /// Line totals of items nobody has claimed yet
    pub unclaimed_subtotal: f64,
    pub total_info: TotalInfo,
}

impl Settlement {
    pub fn share(&self, participant_id: &str) -> Option<&ParticipantShare> {
        self.shares
            .iter()
            .find(|s| s.participant_id == participant_id)
    }

    /// Sum of every claimant's total
    pub fn collected(&self) -> f64 {
        self.shares.iter().map(|s| s.total).sum()
    }
}

/// Sum of a participant's even-split item shares
pub fn claimed_subtotal(session: &Session, participant_id: &str) -> f64 {
    session
        .items
        .iter()
        .filter(|item| item.has_buyer(participant_id))
        .map(|item| item.share_per_buyer())
        .sum()
}

/// Amount a participant owes, tax and tip included
pub fn compute_owed(session: &Session, participant_id: &str) -> f64 {
    share_for(session, participant_id, session.subtotal()).total
}

/// Full settlement for every claimant
pub fn settle(session: &Session) -> Settlement {
    let session_subtotal = session.subtotal();

    let mut by_participant: BTreeMap<ParticipantId, ParticipantShare> = BTreeMap::new();
    for participant_id in session.claimants() {
        let share = share_for(session, &participant_id, session_subtotal);
        by_participant.insert(participant_id, share);
    }

    let unclaimed_subtotal = session
        .items
        .iter()
        .filter(|item| item.buyers.is_empty())
        .map(|item| item.line_total())
        .sum();

    Settlement {
        session_id: session.id.clone(),
        shares: by_participant.into_values().collect(),
        session_subtotal,
        unclaimed_subtotal,
        total_info: session.total_info,
    }
}

fn share_for(session: &Session, participant_id: &str, session_subtotal: f64) -> ParticipantShare {
    let mut share = ParticipantShare::zero(participant_id);
    share.display_name = session.active_users.get(participant_id).cloned();
    share.items_subtotal = claimed_subtotal(session, participant_id);

    if session_subtotal > 0.0 {
        let ratio = share.items_subtotal / session_subtotal;
        share.tax = ratio * session.total_info.tax;
        share.tip = ratio * session.total_info.tip;
    }

    share.total = share.items_subtotal + share.tax + share.tip;
    share
}

/// Round to whole cents for display
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
