//! Session lifecycle management
//!
//! Creates session documents and accepts the bill produced by the external
//! ingestion process.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use super::{Item, Session, TotalsInput, require_session_id};
use crate::error::SessionError;
use crate::store::{FieldUpdate, SessionStore};

/// Creates and configures sessions
pub struct SessionLifecycleManager {
    store: Arc<dyn SessionStore>,
}

impl SessionLifecycleManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Write an empty session document at `session_id`
    ///
    /// There is no existence check: creating an id that is already in use
    /// replaces the earlier session, items and presence included.
    pub async fn create(&self, session_id: &str) -> Result<Session, SessionError> {
        if session_id.trim().is_empty() {
            return Err(SessionError::InvalidArgument(
                "session id is required".to_string(),
            ));
        }

        let session = Session::new(session_id);
        self.store.set(session_id, session.clone()).await?;

        info!(session_id, "session created");
        Ok(session)
    }

    /// Read a session once
    pub async fn load(&self, session_id: &str) -> Result<Session, SessionError> {
        require_session_id(session_id)?;
        Ok(self.store.get(session_id).await?)
    }

    /// Replace the item list and totals in one atomic update
    ///
    /// Buyers already present on incoming items are kept (deduplicated).
    pub async fn ingest_bill(
        &self,
        session_id: &str,
        items: Vec<Item>,
        totals: TotalsInput,
    ) -> Result<Session, SessionError> {
        self.ingest_bill_with_alias(session_id, items, totals, None)
            .await
    }

    /// Like [`ingest_bill`](Self::ingest_bill), also setting the display
    /// label in the same update
    pub async fn ingest_bill_with_alias(
        &self,
        session_id: &str,
        mut items: Vec<Item>,
        totals: TotalsInput,
        alias: Option<&str>,
    ) -> Result<Session, SessionError> {
        require_session_id(session_id)?;

        let mut seen = HashSet::new();
        for item in &mut items {
            item.validate().map_err(SessionError::InvalidArgument)?;
            if !seen.insert(item.id.clone()) {
                return Err(SessionError::InvalidArgument(format!(
                    "duplicate item id {}",
                    item.id
                )));
            }
            item.dedup_buyers();
        }

        let subtotal: f64 = items.iter().map(Item::line_total).sum();
        let total_info = totals.resolve(subtotal)?;

        let mut updates = vec![
            FieldUpdate::SetItems(items),
            FieldUpdate::SetTotalInfo(total_info),
        ];
        if let Some(alias) = alias {
            updates.push(FieldUpdate::SetAlias(alias.trim().to_string()));
        }

        let session = self.store.update(session_id, updates).await?;

        info!(
            session_id,
            items = session.items.len(),
            total = total_info.total,
            "bill ingested"
        );
        Ok(session)
    }

    /// Replace only the totals, resolving rates against the stored items
    pub async fn set_totals(
        &self,
        session_id: &str,
        totals: TotalsInput,
    ) -> Result<Session, SessionError> {
        let current = self.load(session_id).await?;
        let total_info = totals.resolve(current.subtotal())?;

        Ok(self
            .store
            .update(session_id, vec![FieldUpdate::SetTotalInfo(total_info)])
            .await?)
    }

    /// Set the session's display label
    pub async fn set_alias(&self, session_id: &str, alias: &str) -> Result<Session, SessionError> {
        require_session_id(session_id)?;
        Ok(self
            .store
            .update(session_id, vec![FieldUpdate::SetAlias(alias.trim().to_string())])
            .await?)
    }
}
