//! Session management

pub mod claims;
pub mod lifecycle;
pub mod presence;
pub mod state;
pub mod totals;

// Re-export key types for convenience
pub use claims::{ClaimEngine, ClaimStrategy};
pub use lifecycle::SessionLifecycleManager;
pub use presence::PresenceTracker;
pub use state::{Item, Participant, ParticipantId, Session, TotalInfo};
pub use totals::TotalsInput;

use crate::error::SessionError;

/// Mutations need an established session context
pub(crate) fn require_session_id(session_id: &str) -> Result<(), SessionError> {
    if session_id.trim().is_empty() {
        return Err(SessionError::PreconditionFailed(
            "no session selected".to_string(),
        ));
    }
    Ok(())
}

/// Mutations on behalf of a participant need a local identity
pub(crate) fn require_participant(participant_id: Option<&str>) -> Result<&str, SessionError> {
    match participant_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(SessionError::PreconditionFailed(
            "join the session with a name first".to_string(),
        )),
    }
}
