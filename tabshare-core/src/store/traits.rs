//! SessionStore trait definition

use async_trait::async_trait;

use super::{FieldUpdate, SessionSubscription};
use crate::error::StoreError;
use crate::session::Session;

/// Document store keyed by session id
///
/// Implementations must:
/// - Deliver subscription pushes in write order per document
/// - Apply an `update` batch all-or-nothing
/// - Leave the stored document untouched when a call fails
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the current document once
    async fn get(&self, session_id: &str) -> Result<Session, StoreError>;

    /// Overwrite the whole document, creating it if absent
    async fn set(&self, session_id: &str, session: Session) -> Result<(), StoreError>;

    /// Apply field-scoped updates atomically and return the new document
    ///
    /// Fails with `SessionNotFound` if the document does not exist.
    async fn update(
        &self,
        session_id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, StoreError>;

    /// Watch a document
    ///
    /// The first delivery is the current document (or `SessionNotFound`),
    /// followed by every later write. Dropping the handle unsubscribes.
    async fn subscribe(&self, session_id: &str) -> Result<SessionSubscription, StoreError>;
}
