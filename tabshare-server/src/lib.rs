//! tabshare-server - HTTP and WebSocket server for shared bill-splitting sessions
//!
//! The server owns the session store and the lifecycle, presence and claim
//! components built over it. Browsers and the CLI talk to it over plain
//! HTTP for mutations and a per-session WebSocket for live snapshots.

mod error;
pub mod http;
mod state;
pub mod ws;

use std::sync::Arc;

use tokio::net::TcpListener;

pub use error::{ErrorResponse, ServerError};
pub use http::create_router;
pub use state::AppState;

/// The main tabshare server
pub struct TabshareServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TabshareServer {
    /// Create a new server over an in-memory store
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new()),
        }
    }

    /// Create a server with custom state
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server, binding to the configured address
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        self.run_with_listener(listener).await
    }

    /// Run the server on an already-bound listener
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        if let Ok(local) = listener.local_addr() {
            tracing::info!(
                strategy = ?self.state.claims.strategy(),
                "tabshare server listening on {}",
                local
            );
        }

        let router = create_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7450,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket address string (e.g., "127.0.0.1:7450")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7450);
    }

    #[test]
    fn test_server_config_addr() {
        let config = ServerConfig::new("0.0.0.0", 8080);
        assert_eq!(config.addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_tabshare_server_new() {
        let config = ServerConfig::default();
        let server = TabshareServer::new(config.clone());
        assert_eq!(server.config().addr(), config.addr());
    }

    #[test]
    fn test_tabshare_server_with_state() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        let state = Arc::new(AppState::new());
        let server = TabshareServer::with_state(config, Arc::clone(&state));
        assert_eq!(server.config().port, 9000);
        assert!(Arc::ptr_eq(&server.state(), &state));
    }

    #[tokio::test]
    async fn test_run_reports_bind_failure() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = TabshareServer::new(ServerConfig::new("127.0.0.1", port))
            .run()
            .await;

        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
