//! Server error types

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tabshare_core::SessionError;
use thiserror::Error;

/// Errors that can occur in the tabshare server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the specified address
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A session operation was rejected
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Request body could not be understood
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable kind, e.g. `NOT_FOUND`
    pub code: String,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Session(e) => session_status(e),
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Bind { .. } | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ServerError::Session(e) => session_code(e),
            ServerError::InvalidRequest(_) => "INVALID_ARGUMENT",
            ServerError::Bind { .. } | ServerError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// HTTP status for a session error
pub fn session_status(error: &SessionError) -> StatusCode {
    match error {
        SessionError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        SessionError::NotFound(_) | SessionError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
        SessionError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        SessionError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Wire code for a session error, shared by HTTP and WebSocket responses
pub fn session_code(error: &SessionError) -> &'static str {
    match error {
        SessionError::InvalidArgument(_) => "INVALID_ARGUMENT",
        SessionError::NotFound(_) => "NOT_FOUND",
        SessionError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
        SessionError::PreconditionFailed(_) => "PRECONDITION_FAILED",
        SessionError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_status_codes() {
        let cases = [
            (SessionError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (SessionError::NotFound("s1".into()), StatusCode::NOT_FOUND),
            (
                SessionError::ItemNotFound {
                    session_id: "s1".into(),
                    item_id: "i9".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SessionError::PreconditionFailed("x".into()),
                StatusCode::PRECONDITION_FAILED,
            ),
            (
                SessionError::StorageUnavailable("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ServerError::from(error).status(), status);
        }
    }

    #[test]
    fn missing_item_has_its_own_code() {
        let session = ServerError::from(SessionError::NotFound("s1".into()));
        let item = ServerError::from(SessionError::ItemNotFound {
            session_id: "s1".into(),
            item_id: "i9".into(),
        });

        assert_eq!(session.code(), "NOT_FOUND");
        assert_eq!(item.code(), "ITEM_NOT_FOUND");
    }

    #[test]
    fn bind_error_is_internal() {
        let error = ServerError::Bind {
            addr: "127.0.0.1:1".into(),
            source: std::io::Error::other("in use"),
        };
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code(), "INTERNAL_ERROR");
    }
}
