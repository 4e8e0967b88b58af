use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tabshare_core::ClaimStrategy;
use tabshare_core::store::{DEFAULT_CHANNEL_CAPACITY, SESSIONS_FILE};

/// Default host for the tabshare server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the tabshare server
pub const DEFAULT_PORT: u16 = 7450;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTabshareConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub store: RawStoreConfig,

    #[serde(default)]
    pub claims: RawClaimsConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawStoreConfig {
    pub kind: Option<StoreKind>,
    pub path: Option<PathBuf>,
    pub channel_capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClaimsConfig {
    pub strategy: Option<ClaimStrategy>,
}

/// Where session documents live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Lost when the server stops
    #[default]
    Memory,
    /// JSON file rewritten after every change
    File,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TabshareConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub claims: ClaimsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerSection {
    /// Base URL clients use to reach this server
    pub fn base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" => DEFAULT_HOST,
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub kind: StoreKind,
    /// Sessions file for the `file` store
    pub path: PathBuf,
    /// Per-session push buffer; slower subscribers skip to the newest document
    pub channel_capacity: usize,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_store_path(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClaimsSection {
    pub strategy: ClaimStrategy,
}

/// `$XDG_DATA_HOME/tabshare/sessions.json`
pub fn default_store_path() -> PathBuf {
    tabshare_paths::data_dir().join(SESSIONS_FILE)
}
