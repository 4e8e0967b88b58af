//! Client view state
//!
//! A reducer over store pushes and local outcomes. The store stays the only
//! source of truth: the view never edits items optimistically, it only
//! replaces its snapshot when a new document arrives.

use crate::error::StoreError;
use crate::session::{Item, Participant, Session};
use crate::settlement::{self, Settlement};

/// Load status of the watched session
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// Waiting for the first push
    Loading,
    /// At least one document has arrived
    Ready,
    /// Blocking: the session does not exist
    NotFound,
    /// Blocking: the subscription itself failed
    Failed(String),
}

/// Inputs to the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Snapshot(Session),
    Missing,
    StreamFailed(String),
    /// A mutation was rejected; shown as a dismissible banner
    MutationFailed(String),
    DismissError,
    Joined(Participant),
    Left,
}

impl ViewEvent {
    /// Translate one subscription delivery
    pub fn from_delivery(delivery: Result<Session, StoreError>) -> Self {
        match delivery {
            Ok(session) => ViewEvent::Snapshot(session),
            Err(StoreError::SessionNotFound(_)) => ViewEvent::Missing,
            Err(e) => ViewEvent::StreamFailed(e.to_string()),
        }
    }
}

/// Projection of one session for one local participant
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub session_id: String,
    pub status: ViewStatus,
    pub session: Option<Session>,
    pub participant: Option<Participant>,
    pub banner: Option<String>,
}

impl ViewState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            status: ViewStatus::Loading,
            session: None,
            participant: None,
            banner: None,
        }
    }

    /// Apply one event
    pub fn apply(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::Snapshot(session) => {
                self.session = Some(session);
                self.status = ViewStatus::Ready;
            }
            ViewEvent::Missing => {
                self.session = None;
                self.status = ViewStatus::NotFound;
            }
            ViewEvent::StreamFailed(message) => self.status = ViewStatus::Failed(message),
            ViewEvent::MutationFailed(message) => self.banner = Some(message),
            ViewEvent::DismissError => self.banner = None,
            ViewEvent::Joined(participant) => self.participant = Some(participant),
            ViewEvent::Left => self.participant = None,
        }
    }

    /// Consuming form of [`apply`](Self::apply)
    pub fn reduce(mut self, event: ViewEvent) -> Self {
        self.apply(event);
        self
    }

    pub fn items(&self) -> &[Item] {
        self.session.as_ref().map(|s| s.items.as_slice()).unwrap_or(&[])
    }

    /// Claim controls are enabled only with a loaded session and an identity
    pub fn can_claim(&self) -> bool {
        self.status == ViewStatus::Ready && self.participant.is_some()
    }

    /// Whether the local participant currently claims an item
    pub fn has_claimed(&self, item_id: &str) -> bool {
        match (&self.session, &self.participant) {
            (Some(session), Some(me)) => session
                .item(item_id)
                .map(|item| item.has_buyer(&me.id))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// What the local participant owes right now
    pub fn owed(&self) -> f64 {
        match (&self.session, &self.participant) {
            (Some(session), Some(me)) => settlement::compute_owed(session, &me.id),
            _ => 0.0,
        }
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.session.as_ref().map(settlement::settle)
    }
}
