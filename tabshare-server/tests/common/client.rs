//! WebSocket test client for the session socket
//!
//! Provides both low-level WsConnection and high-level TestClient.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Serialize, de::DeserializeOwned};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to a session socket, optionally bound to a participant
    pub async fn connect(addr: SocketAddr, session_id: &str, participant_id: Option<&str>) -> Self {
        let url = match participant_id {
            Some(id) => format!("ws://{}/session/{}/ws?participantId={}", addr, session_id, id),
            None => format!("ws://{}/session/{}/ws", addr, session_id),
        };
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send JSON message
    pub async fn send_json<T: Serialize>(&mut self, msg: &T) {
        let json = serde_json::to_string(msg).unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(Message::Ping(_))) => continue,
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive and deserialize JSON message
    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> T {
        let text = self.recv_raw().await;
        serde_json::from_str(&text).expect("Failed to parse JSON")
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.recv_raw()).await.ok()
    }

    /// Close the connection cleanly
    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// High-level test client with helper methods
pub struct TestClient {
    pub conn: WsConnection,
}

impl TestClient {
    /// Connect and consume the initial snapshot
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr, session_id: &str, participant_id: &str) -> Self {
        let mut conn = WsConnection::connect(addr, session_id, Some(participant_id)).await;

        let first: serde_json::Value = conn.recv_json().await;
        assert_eq!(
            first["type"], "snapshot",
            "Expected snapshot on connect but got: {}",
            first
        );

        Self { conn }
    }

    /// Join the session under the connection's participant id
    #[allow(dead_code)]
    pub async fn join(&mut self, display_name: &str) {
        self.conn
            .send_json(&serde_json::json!({
                "type": "join",
                "display_name": display_name,
            }))
            .await;
    }

    /// Toggle a claim on an item
    #[allow(dead_code)]
    pub async fn toggle(&mut self, item_id: &str) {
        self.conn
            .send_json(&serde_json::json!({
                "type": "toggle",
                "item_id": item_id,
            }))
            .await;
    }

    /// Receive next message
    #[allow(dead_code)]
    pub async fn recv(&mut self) -> serde_json::Value {
        self.conn.recv_json().await
    }

    /// Receive messages until a snapshot satisfies the predicate
    #[allow(dead_code)]
    pub async fn expect_snapshot<F>(&mut self, timeout: Duration, predicate: F) -> serde_json::Value
    where
        F: Fn(&serde_json::Value) -> bool,
    {
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            if let Some(text) = self.conn.recv_timeout(Duration::from_millis(50)).await {
                let msg: serde_json::Value = serde_json::from_str(&text).unwrap();
                if msg["type"] == "snapshot" && predicate(&msg["session"]) {
                    return msg["session"].clone();
                }
            }
        }
        panic!("Timeout waiting for matching snapshot");
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        assert!(
            self.conn.recv_timeout(duration).await.is_none(),
            "Expected no message but received one"
        );
    }
}
