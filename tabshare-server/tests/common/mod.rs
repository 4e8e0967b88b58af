//! Shared test utilities for tabshare-server integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;

use tabshare_core::{ClaimStrategy, MemorySessionStore, SessionStore};
use tabshare_server::{AppState, ServerConfig, TabshareServer};
use tokio::net::TcpListener;

/// Creates a test server with an in-memory store, returns state and address
#[allow(dead_code)]
pub async fn create_test_server() -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_strategy(ClaimStrategy::Atomic).await
}

/// Creates a test server using the given claim strategy
#[allow(dead_code)]
pub async fn create_test_server_with_strategy(
    strategy: ClaimStrategy,
) -> (Arc<AppState>, SocketAddr) {
    create_test_server_with_store(Arc::new(MemorySessionStore::default()), strategy).await
}

/// Creates a test server over an existing store
#[allow(dead_code)]
pub async fn create_test_server_with_store(
    store: Arc<dyn SessionStore>,
    strategy: ClaimStrategy,
) -> (Arc<AppState>, SocketAddr) {
    let state = Arc::new(AppState::with_store(store, strategy));

    let server = TabshareServer::with_state(ServerConfig::default(), Arc::clone(&state));
    let addr = spawn_server(server).await;

    (state, addr)
}

/// Creates a session with a two-item bill through the HTTP API
#[allow(dead_code)]
pub async fn seed_session(addr: SocketAddr, session_id: &str) {
    let http = reqwest::Client::new();
    let response = http
        .post(format!("http://{}/session", addr))
        .json(&serde_json::json!({ "sessionId": session_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = http
        .put(format!("http://{}/session/{}/bill", addr, session_id))
        .json(&serde_json::json!({
            "items": [
                { "id": "i1", "name": "Pizza", "price": 20.95, "quantity": 1 },
                { "id": "i2", "name": "Pasta", "price": 35.95, "quantity": 1 }
            ],
            "totals": { "mode": "fixed", "total": 73.79, "tax": 5.89, "tip": 11.0 }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

/// Spawns server in background task, returns bound address
async fn spawn_server(server: TabshareServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
