//! Error types for tabshare-core

use thiserror::Error;

/// Top-level error type for tabshare-core
#[derive(Error, Debug)]
pub enum TabshareError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Errors surfaced by session operations
///
/// Every failed mutation leaves the stored document untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Required input is missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The session document does not exist
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session exists but has no item with this id
    #[error("Item {item_id} not found in session {session_id}")]
    ItemNotFound { session_id: String, item_id: String },

    /// The store could not be reached or failed to persist
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Identity or session context has not been established
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

impl SessionError {
    /// True for both missing sessions and missing items
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::ItemNotFound { .. })
    }
}

/// Errors raised inside a session store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("item {item_id} not found in session {session_id}")]
    ItemNotFound { session_id: String, item_id: String },

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize sessions: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::SessionNotFound(id) => SessionError::NotFound(id),
            StoreError::ItemNotFound {
                session_id,
                item_id,
            } => SessionError::ItemNotFound {
                session_id,
                item_id,
            },
            other => SessionError::StorageUnavailable(other.to_string()),
        }
    }
}

/// Errors from the locally persisted participant identity
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to access identity file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity file is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_not_found_displays_correctly() {
        let error = SessionError::NotFound("dinner".to_string());
        assert!(error.to_string().contains("Session not found"));
        assert!(error.to_string().contains("dinner"));
    }

    #[test]
    fn item_not_found_counts_as_not_found() {
        let error = SessionError::ItemNotFound {
            session_id: "s1".to_string(),
            item_id: "i9".to_string(),
        };
        assert!(error.is_not_found());
        assert!(error.to_string().contains("i9"));
        assert!(!SessionError::PreconditionFailed("no identity".into()).is_not_found());
    }

    #[test]
    fn store_not_found_maps_to_session_not_found() {
        let error: SessionError = StoreError::SessionNotFound("s1".to_string()).into();
        assert_eq!(error, SessionError::NotFound("s1".to_string()));
    }

    #[test]
    fn store_io_failure_maps_to_storage_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let error: SessionError = StoreError::Io(io).into();
        assert!(matches!(error, SessionError::StorageUnavailable(msg) if msg.contains("read-only")));
    }

    #[test]
    fn tabshare_error_converts_from_session_error() {
        let error: TabshareError = SessionError::InvalidArgument("empty".into()).into();
        assert!(matches!(error, TabshareError::Session(_)));
        assert!(error.to_string().contains("Session error"));
    }
}
