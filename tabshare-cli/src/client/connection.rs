//! WebSocket connection to one session

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use tabshare_server::ws::{ClientMessage, ServerMessage};

use super::ws_base_url;

/// Live connection to a session's snapshot stream
pub struct SessionSocket {
    /// Sender for outgoing messages
    tx: mpsc::Sender<ClientMessage>,
    /// Receiver for incoming messages
    rx: mpsc::Receiver<ServerMessage>,
}

impl SessionSocket {
    /// Connect to `/session/{id}/ws` on the server at `base_url`
    pub async fn connect(base_url: &str, session_id: &str, participant_id: Option<&str>) -> Result<Self> {
        Self::connect_url(&session_ws_url(base_url, session_id, participant_id)).await
    }

    /// Connect to a session socket URL
    pub async fn connect_url(url: &str) -> Result<Self> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;

        let (ws_sender, ws_receiver) = ws_stream.split();

        // Create channels for bidirectional communication
        let (outgoing_tx, outgoing_rx) = mpsc::channel::<ClientMessage>(32);
        let (incoming_tx, incoming_rx) = mpsc::channel::<ServerMessage>(32);

        tokio::spawn(Self::spawn_outgoing_task(outgoing_rx, ws_sender));
        tokio::spawn(Self::spawn_incoming_task(ws_receiver, incoming_tx));

        Ok(Self {
            tx: outgoing_tx,
            rx: incoming_rx,
        })
    }

    /// Send a message to the server
    pub async fn send(&self, msg: ClientMessage) -> Result<()> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| anyhow::anyhow!("Session connection closed"))
    }

    /// Receive a message from the server
    ///
    /// Returns None if the connection is closed
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    pub async fn join(&self, display_name: &str) -> Result<()> {
        self.send(ClientMessage::Join {
            display_name: display_name.to_string(),
        })
        .await
    }

    pub async fn toggle(&self, item_id: &str) -> Result<()> {
        self.send(ClientMessage::Toggle {
            item_id: item_id.to_string(),
        })
        .await
    }

    /// Forward outgoing messages to the WebSocket
    ///
    /// Dropping the socket closes the channel, which sends a close frame so
    /// the server clears this participant's presence.
    async fn spawn_outgoing_task<S>(mut rx: mpsc::Receiver<ClientMessage>, mut ws_sender: S)
    where
        S: SinkExt<Message> + Unpin,
        S::Error: std::fmt::Debug,
    {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    debug!("Sending: {}", json);
                    if let Err(e) = ws_sender.send(Message::Text(json.into())).await {
                        warn!("Failed to send WebSocket message: {:?}", e);
                        return;
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize message: {}", e);
                }
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    }

    /// Receive incoming messages from the WebSocket
    async fn spawn_incoming_task<S>(mut ws_receiver: S, tx: mpsc::Sender<ServerMessage>)
    where
        S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let text_str: &str = &text;
                    match serde_json::from_str::<ServerMessage>(text_str) {
                        Ok(msg) => {
                            if tx.send(msg).await.is_err() {
                                debug!("Receiver dropped, stopping incoming task");
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Failed to parse server message: {}", e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Received close message");
                    break;
                }
                Ok(_) => {
                    // Ping is answered by tungstenite; binary and raw frames are unused
                }
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
            }
        }
    }
}

/// URL of a session socket, optionally bound to a participant
pub fn session_ws_url(base_url: &str, session_id: &str, participant_id: Option<&str>) -> String {
    let base = ws_base_url(base_url);
    let session_id = urlencoding::encode(session_id);
    match participant_id {
        Some(id) => format!(
            "{}/session/{}/ws?participantId={}",
            base,
            session_id,
            urlencoding::encode(id)
        ),
        None => format!("{}/session/{}/ws", base, session_id),
    }
}
