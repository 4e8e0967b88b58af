use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::{
    ClaimsSection, DEFAULT_HOST, DEFAULT_PORT, RawClaimsConfig, RawServerConfig, RawStoreConfig,
    RawTabshareConfig, ServerSection, StoreSection, TabshareConfig, default_store_path,
};

/// Env var that relocates the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "TABSHARE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<TabshareConfig> {
        Self::load_layers(&Self::user_config_path(), &Self::project_config_path())
    }

    /// Merge the given layers; missing files are skipped
    pub fn load_layers(user_path: &Path, project_path: &Path) -> Result<TabshareConfig> {
        let mut raw = RawTabshareConfig::default();

        // Layer 1: User config
        if let Some(user_config) = Self::read_raw(user_path)? {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        Ok(Self::finalize(raw))
    }

    /// `$XDG_CONFIG_HOME/tabshare/config.toml`
    pub fn user_config_path() -> PathBuf {
        tabshare_paths::config_dir().join("config.toml")
    }

    /// Get project config path
    /// Can be overridden with TABSHARE_PROJECT_CONFIG_DIR (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        match std::env::var(PROJECT_CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir).join("config.toml"),
            Err(_) => PathBuf::from(".tabshare/config.toml"),
        }
    }

    fn read_raw(path: &Path) -> Result<Option<RawTabshareConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawTabshareConfig, overlay: RawTabshareConfig) -> RawTabshareConfig {
        RawTabshareConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            store: RawStoreConfig {
                kind: overlay.store.kind.or(base.store.kind),
                path: overlay.store.path.or(base.store.path),
                channel_capacity: overlay
                    .store
                    .channel_capacity
                    .or(base.store.channel_capacity),
            },
            claims: RawClaimsConfig {
                strategy: overlay.claims.strategy.or(base.claims.strategy),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawTabshareConfig) -> TabshareConfig {
        let store_defaults = StoreSection::default();
        TabshareConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            store: StoreSection {
                kind: raw.store.kind.unwrap_or(store_defaults.kind),
                path: raw.store.path.unwrap_or_else(default_store_path),
                channel_capacity: raw
                    .store
                    .channel_capacity
                    .filter(|capacity| *capacity > 0)
                    .unwrap_or(store_defaults.channel_capacity),
            },
            claims: ClaimsSection {
                strategy: raw.claims.strategy.unwrap_or_default(),
            },
        }
    }

    /// Save config to a specific path
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to_path(config: &TabshareConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(config)?;
        std::fs::write(path, toml)?;

        Ok(())
    }
}
