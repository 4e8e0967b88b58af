//! WebSocket connection handling

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tabshare_core::SessionError;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::error::ServerError;

use super::protocol::{ClientMessage, ServerMessage};

/// Query parameters of the session socket
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    /// Participant bound to this connection, if the client has an identity
    pub participant_id: Option<String>,
}

/// GET /session/:id/ws - Upgrade to a live snapshot stream
pub async fn session_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(params): Query<WsParams>,
) -> impl IntoResponse {
    let participant_id = params.participant_id.filter(|id| !id.is_empty());
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id, participant_id))
}

/// Handle a WebSocket connection
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: String,
    participant_id: Option<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    let mut subscription = match state.store.subscribe(&session_id).await {
        Ok(subscription) => subscription,
        Err(e) => {
            let error = ServerError::from(SessionError::from(e));
            let _ = send_message(&mut sender, &ServerMessage::error(&error)).await;
            return;
        }
    };

    if let Some(participant_id) = &participant_id {
        state.connections.attach(&session_id, participant_id).await;
    }
    info!(%session_id, participant_id = ?participant_id, "WebSocket client connected");

    loop {
        tokio::select! {
            delivery = subscription.next() => {
                let Some(delivery) = delivery else {
                    debug!(%session_id, "session channel closed");
                    break;
                };
                let message = match delivery {
                    Ok(session) => ServerMessage::Snapshot { session },
                    Err(e) => ServerMessage::error(&ServerError::from(SessionError::from(e))),
                };
                if send_message(&mut sender, &message).await.is_err() {
                    break;
                }
            }
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) =
                            handle_text_message(&text, &state, &session_id, participant_id.as_deref()).await
                        {
                            debug!(%session_id, "rejected client message: {}", e);
                            if send_message(&mut sender, &ServerMessage::error(&e)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client sent close frame");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // Ignore binary and pong messages
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    // Presence ends with the participant's last connection; claims stay until
    // an explicit leave
    if let Some(participant_id) = participant_id {
        match state.connections.detach(&session_id, &participant_id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(%session_id, %participant_id, "failed to clear presence: {}", e),
        }
    }

    info!(%session_id, "WebSocket client disconnected");
}

/// Handle a text message from the client
async fn handle_text_message(
    text: &str,
    state: &AppState,
    session_id: &str,
    participant_id: Option<&str>,
) -> Result<(), ServerError> {
    let client_msg: ClientMessage =
        serde_json::from_str(text).map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

    match client_msg {
        ClientMessage::Join { display_name } => {
            state
                .presence
                .join(session_id, participant_id.unwrap_or_default(), &display_name)
                .await?;
        }
        ClientMessage::Toggle { item_id } => {
            state
                .claims
                .toggle_claim(session_id, &item_id, participant_id)
                .await?;
        }
        ClientMessage::Leave => {
            state
                .presence
                .leave(session_id, participant_id.unwrap_or_default())
                .await?;
        }
    }

    Ok(())
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to encode server message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json)).await
}
