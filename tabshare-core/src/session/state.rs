//! Session document and its items
//!
//! A [`Session`] is the unit stored and pushed by a session store. Field
//! names serialize in camelCase so documents match what browser clients
//! already read (`totalInfo`, `activeUsers`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque, device-stable participant identifier
pub type ParticipantId = String;

/// A participant as registered in a session's presence map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
}

impl Participant {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// A purchased line on the bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique within the session
    pub id: String,
    pub name: String,
    /// Unit price
    pub price: f64,
    pub quantity: u32,
    /// Participants who claimed this item; never contains duplicates
    #[serde(default)]
    pub buyers: Vec<ParticipantId>,
    /// Headcount recorded by the ingestion process
    #[serde(default)]
    pub people: u32,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
            buyers: Vec::new(),
            people: 0,
        }
    }

    /// Builder-style helper used by ingestion and tests
    pub fn with_buyers<I, S>(mut self, buyers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for buyer in buyers {
            self.add_buyer(&buyer.into());
        }
        self
    }

    /// `price × quantity`
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Even split of the line total among current claimants
    pub fn share_per_buyer(&self) -> f64 {
        self.line_total() / self.buyers.len().max(1) as f64
    }

    pub fn has_buyer(&self, participant_id: &str) -> bool {
        self.buyers.iter().any(|b| b == participant_id)
    }

    /// Set-union of a single id. Returns false if already present.
    pub fn add_buyer(&mut self, participant_id: &str) -> bool {
        if self.has_buyer(participant_id) {
            return false;
        }
        self.buyers.push(participant_id.to_string());
        true
    }

    /// Set-remove of a single id. Returns false if it was absent.
    pub fn remove_buyer(&mut self, participant_id: &str) -> bool {
        let before = self.buyers.len();
        self.buyers.retain(|b| b != participant_id);
        before != self.buyers.len()
    }

    /// Flip claim state; returns true when the participant is now a buyer
    pub fn toggle_buyer(&mut self, participant_id: &str) -> bool {
        if self.remove_buyer(participant_id) {
            false
        } else {
            self.buyers.push(participant_id.to_string());
            true
        }
    }

    /// Check the item is acceptable for ingestion
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("item id must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("item {} has invalid price {}", self.id, self.price));
        }
        if self.quantity < 1 {
            return Err(format!("item {} must have quantity >= 1", self.id));
        }
        Ok(())
    }

    /// Drop duplicate buyers while keeping first occurrences
    pub(crate) fn dedup_buyers(&mut self) {
        let mut seen = Vec::with_capacity(self.buyers.len());
        self.buyers.retain(|b| {
            if seen.contains(b) {
                false
            } else {
                seen.push(b.clone());
                true
            }
        });
    }
}

/// Session-wide aggregate figures
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TotalInfo {
    pub total: f64,
    pub tax: f64,
    pub tip: f64,
}

impl TotalInfo {
    pub fn new(total: f64, tax: f64, tip: f64) -> Self {
        Self { total, tax, tip }
    }
}

/// A shared bill-splitting session document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub total_info: TotalInfo,
    /// Display label
    #[serde(default)]
    pub alias: String,
    /// participant id -> display name
    #[serde(default)]
    pub active_users: BTreeMap<ParticipantId, String>,
}

impl Session {
    /// An empty session: no items, zero totals, nobody present
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            total_info: TotalInfo::default(),
            alias: String::new(),
            active_users: BTreeMap::new(),
        }
    }

    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }

    /// Sum of `price × quantity` over every item, claimed or not
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(Item::line_total).sum()
    }

    pub fn is_active(&self, participant_id: &str) -> bool {
        self.active_users.contains_key(participant_id)
    }

    /// Active participants ordered by id
    pub fn participants(&self) -> Vec<Participant> {
        self.active_users
            .iter()
            .map(|(id, name)| Participant::new(id.clone(), name.clone()))
            .collect()
    }

    /// Every participant id that holds at least one claim
    pub fn claimants(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = Vec::new();
        for buyer in self.items.iter().flat_map(|i| i.buyers.iter()) {
            if !ids.contains(buyer) {
                ids.push(buyer.clone());
            }
        }
        ids
    }

    /// Flip one participant's claim on one item in this copy of the document.
    ///
    /// Returns the claim state after the flip, or `None` if the item is absent.
    pub fn toggle_claim(&mut self, item_id: &str, participant_id: &str) -> Option<bool> {
        self.item_mut(item_id)
            .map(|item| item.toggle_buyer(participant_id))
    }

    /// Strip a participant from every item's buyers. Returns how many items changed.
    pub fn detach_buyer(&mut self, participant_id: &str) -> usize {
        self.items
            .iter_mut()
            .filter_map(|item| item.remove_buyer(participant_id).then_some(()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        let mut session = Session::new("dinner");
        session.items = vec![
            Item::new("i1", "Pizza", 20.95, 1).with_buyers(["u1", "u2"]),
            Item::new("i2", "Wings", 12.0, 2).with_buyers(["u1"]),
            Item::new("i3", "Soda", 2.5, 4),
        ];
        session
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new("s1");
        assert_eq!(session.id, "s1");
        assert!(session.items.is_empty());
        assert_eq!(session.total_info, TotalInfo::default());
        assert!(session.alias.is_empty());
        assert!(session.active_users.is_empty());
    }

    #[test]
    fn add_buyer_never_duplicates() {
        let mut item = Item::new("i1", "Pizza", 10.0, 1);
        assert!(item.add_buyer("u1"));
        assert!(!item.add_buyer("u1"));
        assert_eq!(item.buyers, vec!["u1"]);
    }

    #[test]
    fn toggle_buyer_flips_membership() {
        let mut item = Item::new("i1", "Pizza", 10.0, 1).with_buyers(["u2"]);
        assert!(item.toggle_buyer("u1"));
        assert!(item.has_buyer("u1"));
        assert!(!item.toggle_buyer("u1"));
        assert_eq!(item.buyers, vec!["u2"]);
    }

    #[test]
    fn share_per_buyer_guards_empty_buyers() {
        let item = Item::new("i1", "Soda", 2.5, 4);
        assert_eq!(item.share_per_buyer(), 10.0);
    }

    #[test]
    fn subtotal_counts_unclaimed_items() {
        let session = sample_session();
        assert!((session.subtotal() - 54.95).abs() < 1e-9);
    }

    #[test]
    fn toggle_claim_reports_missing_item() {
        let mut session = sample_session();
        assert_eq!(session.toggle_claim("nope", "u1"), None);
        assert_eq!(session.toggle_claim("i3", "u1"), Some(true));
    }

    #[test]
    fn detach_buyer_strips_every_item() {
        let mut session = sample_session();
        assert_eq!(session.detach_buyer("u1"), 2);
        assert!(session.items.iter().all(|i| !i.has_buyer("u1")));
        assert_eq!(session.item("i1").unwrap().buyers, vec!["u2"]);
    }

    #[test]
    fn claimants_lists_each_buyer_once() {
        let session = sample_session();
        assert_eq!(session.claimants(), vec!["u1", "u2"]);
    }

    #[test]
    fn validate_rejects_bad_items() {
        assert!(Item::new("", "x", 1.0, 1).validate().is_err());
        assert!(Item::new("i1", "x", -1.0, 1).validate().is_err());
        assert!(Item::new("i1", "x", f64::NAN, 1).validate().is_err());
        assert!(Item::new("i1", "x", 1.0, 0).validate().is_err());
        assert!(Item::new("i1", "x", 0.0, 1).validate().is_ok());
    }

    #[test]
    fn dedup_buyers_keeps_first_occurrence() {
        let mut item = Item::new("i1", "x", 1.0, 1);
        item.buyers = vec!["a".into(), "b".into(), "a".into()];
        item.dedup_buyers();
        assert_eq!(item.buyers, vec!["a", "b"]);
    }

    #[test]
    fn session_serializes_with_camel_case_fields() {
        let mut session = sample_session();
        session
            .active_users
            .insert("u1".to_string(), "Ana".to_string());

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("totalInfo").is_some());
        assert_eq!(json["activeUsers"]["u1"], "Ana");

        let parsed: Session = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, session);
    }

    #[test]
    fn session_deserializes_sparse_document() {
        let parsed: Session = serde_json::from_str(r#"{"id":"s1"}"#).unwrap();
        assert_eq!(parsed, Session::new("s1"));
    }
}
