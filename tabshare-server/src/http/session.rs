//! Session API handlers
//!
//! Thin adapters from HTTP to the lifecycle, presence and claim components.
//! Every mutation is reflected to WebSocket subscribers by the store itself,
//! so handlers only return the immediate result.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tabshare_core::settlement::{self, Settlement};
use tabshare_core::{Item, Participant, Session, TotalsInput};

use crate::AppState;
use crate::error::{ErrorResponse, ServerError};

/// Request body for POST /session
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Request body for PUT /session/:id/bill
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestBillRequest {
    pub items: Vec<Item>,
    pub totals: TotalsInput,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Request body for POST /session/:id/join
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(default)]
    pub participant_id: String,
    #[serde(default)]
    pub display_name: String,
}

/// Request body for leave and toggle
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRequest {
    #[serde(default)]
    pub participant_id: Option<String>,
}

/// Active participants after a join
#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    pub participants: Vec<Participant>,
}

/// What one participant owes
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwedResponse {
    pub participant_id: String,
    pub owed: f64,
}

/// POST /session - Create (or reset) a session document
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let session_id = body
        .ok()
        .and_then(|Json(request)| request.session_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("Session ID is required.".to_string()))?;

    state.lifecycle.create(&session_id).await?;

    Ok(Json(MessageResponse {
        message: "Session created successfully".to_string(),
    }))
}

/// Any other method on /session
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method Not Allowed".to_string(),
            code: "METHOD_NOT_ALLOWED".to_string(),
        }),
    )
}

/// GET /session/:id - Current document
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ServerError> {
    Ok(Json(state.lifecycle.load(&session_id).await?))
}

/// PUT /session/:id/bill - Replace items and totals
pub async fn ingest_bill(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<IngestBillRequest>,
) -> Result<Json<Session>, ServerError> {
    let session = state
        .lifecycle
        .ingest_bill_with_alias(
            &session_id,
            request.items,
            request.totals,
            request.alias.as_deref(),
        )
        .await?;

    Ok(Json(session))
}

/// POST /session/:id/join
pub async fn join(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<ParticipantsResponse>, ServerError> {
    state
        .presence
        .join(&session_id, &request.participant_id, &request.display_name)
        .await?;

    let participants = state.presence.active_participants(&session_id).await?;
    Ok(Json(ParticipantsResponse { participants }))
}

/// POST /session/:id/leave - Drop presence and every claim
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<ParticipantRequest>,
) -> Result<StatusCode, ServerError> {
    let participant_id = request.participant_id.unwrap_or_default();
    state.presence.leave(&session_id, &participant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /session/:id/items/:item_id/toggle
pub async fn toggle_item(
    State(state): State<Arc<AppState>>,
    Path((session_id, item_id)): Path<(String, String)>,
    Json(request): Json<ParticipantRequest>,
) -> Result<Json<Item>, ServerError> {
    let item = state
        .claims
        .toggle_claim(&session_id, &item_id, request.participant_id.as_deref())
        .await?;
    Ok(Json(item))
}

/// GET /session/:id/settlement
pub async fn get_settlement(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Settlement>, ServerError> {
    let session = state.lifecycle.load(&session_id).await?;
    Ok(Json(settlement::settle(&session)))
}

/// GET /session/:id/settlement/:participant_id
pub async fn get_owed(
    State(state): State<Arc<AppState>>,
    Path((session_id, participant_id)): Path<(String, String)>,
) -> Result<Json<OwedResponse>, ServerError> {
    let session = state.lifecycle.load(&session_id).await?;
    let owed = settlement::compute_owed(&session, &participant_id);
    Ok(Json(OwedResponse {
        participant_id,
        owed,
    }))
}
