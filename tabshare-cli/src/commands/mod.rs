pub mod config;
pub mod identity;
pub mod participant;
pub mod serve;
pub mod session;
pub mod watch;

use tabshare_core::{IdentityStore, ParticipantIdentity};

/// Load this device's identity, creating it on first use
pub async fn local_identity() -> anyhow::Result<ParticipantIdentity> {
    Ok(IdentityStore::default_location().load_or_create().await?)
}
