//! HTTP server module

mod api;
mod session;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::ws;

pub use api::HealthResponse;
pub use session::{
    CreateSessionRequest, IngestBillRequest, JoinRequest, MessageResponse, OwedResponse,
    ParticipantRequest, ParticipantsResponse,
};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route(
            "/session",
            post(session::create_session).fallback(session::method_not_allowed),
        )
        .route("/session/:session_id", get(session::get_session))
        .route("/session/:session_id/bill", put(session::ingest_bill))
        .route("/session/:session_id/join", post(session::join))
        .route("/session/:session_id/leave", post(session::leave))
        .route(
            "/session/:session_id/items/:item_id/toggle",
            post(session::toggle_item),
        )
        .route("/session/:session_id/settlement", get(session::get_settlement))
        .route(
            "/session/:session_id/settlement/:participant_id",
            get(session::get_owed),
        )
        .route("/session/:session_id/ws", get(ws::session_ws))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_router_has_health_endpoint() {
        let state = Arc::new(AppState::new());
        let router = create_router(state);
        let server = TestServer::new(router).unwrap();

        let response = server.get("/api/health").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let server = TestServer::new(create_router(Arc::new(AppState::new()))).unwrap();

        let response = server.get("/sessions").await;
        response.assert_status_not_found();
    }
}
