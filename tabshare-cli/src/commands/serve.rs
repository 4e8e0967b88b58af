//! Tabshare serve command
//!
//! Runs the HTTP and WebSocket server over the configured session store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tabshare_core::{ClaimStrategy, JsonFileSessionStore, MemorySessionStore, SessionStore};
use tabshare_server::{AppState, ServerConfig, TabshareServer};
use tracing::info;

use crate::config::{StoreKind, TabshareConfig};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Session store backend
    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    /// Sessions file for the file store
    #[arg(long)]
    pub store_path: Option<PathBuf>,

    /// How claim toggles are written: atomic or overwrite
    #[arg(long)]
    pub strategy: Option<ClaimStrategy>,
}

/// Flags override the loaded configuration
fn apply_overrides(args: ServeArgs, mut config: TabshareConfig) -> TabshareConfig {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(kind) = args.store {
        config.store.kind = kind;
    }
    if let Some(path) = args.store_path {
        config.store.path = path;
    }
    if let Some(strategy) = args.strategy {
        config.claims.strategy = strategy;
    }
    config
}

/// Open the configured store
async fn open_store(config: &TabshareConfig) -> Result<Arc<dyn SessionStore>> {
    let capacity = config.store.channel_capacity;
    let store: Arc<dyn SessionStore> = match config.store.kind {
        StoreKind::Memory => Arc::new(MemorySessionStore::new(capacity)),
        StoreKind::File => {
            let store = JsonFileSessionStore::load(&config.store.path, capacity)
                .await
                .with_context(|| {
                    format!("Failed to open sessions file {}", config.store.path.display())
                })?;
            info!(path = %config.store.path.display(), "using file session store");
            Arc::new(store)
        }
    };
    Ok(store)
}

/// Run the serve command
pub async fn run(args: ServeArgs, config: TabshareConfig) -> Result<()> {
    let config = apply_overrides(args, config);
    let store = open_store(&config).await?;

    let state = Arc::new(AppState::with_store(store, config.claims.strategy));
    let server_config = ServerConfig::new(config.server.host.clone(), config.server.port);

    info!(
        "Starting tabshare server on {}:{}",
        server_config.host, server_config.port
    );
    if config.claims.strategy == ClaimStrategy::Overwrite {
        tracing::warn!("overwrite claim strategy can lose concurrent claims on the same item");
    }

    TabshareServer::with_state(server_config, state)
        .run()
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_overrides() -> ServeArgs {
        ServeArgs {
            port: None,
            host: None,
            store: None,
            store_path: None,
            strategy: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let args = ServeArgs {
            port: Some(9999),
            strategy: Some(ClaimStrategy::Overwrite),
            ..no_overrides()
        };

        let config = apply_overrides(args, TabshareConfig::default());

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.host, crate::config::DEFAULT_HOST);
        assert_eq!(config.claims.strategy, ClaimStrategy::Overwrite);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut base = TabshareConfig::default();
        base.server.port = 8000;

        let config = apply_overrides(no_overrides(), base);

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.store.kind, StoreKind::Memory);
    }

    #[tokio::test]
    async fn test_file_store_is_created_at_configured_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TabshareConfig::default();
        config.store.kind = StoreKind::File;
        config.store.path = temp_dir.path().join("data").join("sessions.json");

        let store = open_store(&config).await.unwrap();
        store
            .set("s1", tabshare_core::Session::new("s1"))
            .await
            .unwrap();

        assert!(config.store.path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_sessions_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sessions.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut config = TabshareConfig::default();
        config.store.kind = StoreKind::File;
        config.store.path = path;

        let err = open_store(&config).await.err().unwrap();

        assert!(err.to_string().contains("sessions.json"));
    }
}
