//! XDG Base Directory paths for tabshare.
//!
//! The CLI and the server use XDG paths on every platform, not
//! platform-native ones, so a config file lives in the same place everywhere.

use std::path::PathBuf;

const APP_DIR: &str = "tabshare";

/// Get the tabshare config directory.
///
/// Returns `$XDG_CONFIG_HOME/tabshare` if set, otherwise `~/.config/tabshare`.
/// Holds `config.toml` and the device's `identity.json`.
///
/// # Examples
///
/// ```
/// use tabshare_paths::config_dir;
///
/// let config = config_dir();
/// let identity = config.join("identity.json");
/// ```
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Get the tabshare data directory.
///
/// Returns `$XDG_DATA_HOME/tabshare` if set, otherwise `~/.local/share/tabshare`.
/// The file-backed session store writes `sessions.json` here by default.
///
/// # Examples
///
/// ```
/// use tabshare_paths::data_dir;
///
/// let sessions = data_dir().join("sessions.json");
/// ```
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn xdg_dir(env_var: &str, home_fallback: &str) -> PathBuf {
    match std::env::var(env_var) {
        Ok(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => match dirs::home_dir() {
            Some(home) => home.join(home_fallback).join(APP_DIR),
            None => PathBuf::from(home_fallback).join(APP_DIR),
        },
    }
}
