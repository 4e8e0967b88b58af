//! Locally persisted participant identity
//!
//! One device gets one random participant id, reused for every session it
//! joins. The display name is chosen on first join and remembered.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::IdentityError;
use crate::session::Participant;

/// Identity file name inside the tabshare config directory
pub const IDENTITY_FILE: &str = "identity.json";

/// The anonymous identity of this device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ParticipantIdentity {
    fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name: None,
            created_at: Utc::now(),
        }
    }

    /// The identity as a session participant, once a name has been chosen
    pub fn participant(&self) -> Option<Participant> {
        self.display_name
            .as_ref()
            .map(|name| Participant::new(self.id.clone(), name.clone()))
    }
}

/// Reads and writes the identity file
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/tabshare/identity.json`
    pub fn default_location() -> Self {
        Self::new(tabshare_paths::config_dir().join(IDENTITY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored identity, generating and saving one on first use
    pub async fn load_or_create(&self) -> Result<ParticipantIdentity, IdentityError> {
        if fs::try_exists(&self.path).await? {
            let content = fs::read_to_string(&self.path).await?;
            return Ok(serde_json::from_str(&content)?);
        }

        let identity = ParticipantIdentity::generate();
        self.save(&identity).await?;
        info!(participant_id = %identity.id, "generated new participant identity");
        Ok(identity)
    }

    /// Remember the display name used when joining sessions
    pub async fn set_display_name(&self, name: &str) -> Result<ParticipantIdentity, IdentityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::InvalidArgument(
                "please enter your name".to_string(),
            ));
        }

        let mut identity = self.load_or_create().await?;
        identity.display_name = Some(name.to_string());
        self.save(&identity).await?;
        Ok(identity)
    }

    /// Forget this device's identity; the next load generates a new id
    pub async fn reset(&self) -> Result<(), IdentityError> {
        if fs::try_exists(&self.path).await? {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }

    async fn save(&self, identity: &ParticipantIdentity) -> Result<(), IdentityError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(identity)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}
