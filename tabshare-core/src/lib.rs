//! tabshare-core: Core library for shared bill-splitting sessions
//!
//! This crate provides the foundational components for tabshare:
//!
//! - **Session store** - [`SessionStore`] trait with [`MemorySessionStore`] and
//!   [`JsonFileSessionStore`] implementations, field-scoped atomic updates and
//!   scoped subscriptions
//! - **Lifecycle** - [`SessionLifecycleManager`] for creating sessions and ingesting bills
//! - **Presence** - [`PresenceTracker`] for the active-participant map
//! - **Claims** - [`ClaimEngine`] for toggling item claims
//! - **Settlement** - [`settlement::compute_owed`] and [`settlement::settle`]
//! - **Identity** - [`IdentityStore`] for the device-local participant identity
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tabshare_core::{ClaimEngine, ClaimStrategy, MemorySessionStore, SessionLifecycleManager};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemorySessionStore::default());
//!     let lifecycle = SessionLifecycleManager::new(store.clone());
//!     let claims = ClaimEngine::new(store.clone(), ClaimStrategy::Atomic);
//!
//!     lifecycle.create("friday-dinner").await?;
//!     let item = claims.toggle_claim("friday-dinner", "i1", Some("u1")).await;
//!     println!("{:?}", item);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  intents   ┌──────────────────────────────┐
//! │  client  │──────────▶ │ ClaimEngine / PresenceTracker│
//! │ ViewState│            └──────────────┬───────────────┘
//! └────▲─────┘                           │ FieldUpdate batch
//!      │  push (every write)      ┌──────▼───────┐
//!      └──────────────────────────│ SessionStore │
//!                                 └──────────────┘
//! ```

pub mod error;
pub mod identity;
pub mod session;
pub mod settlement;
pub mod store;
pub mod view;

// Re-export key types for convenience
pub use error::{IdentityError, SessionError, StoreError, TabshareError};
pub use identity::{IdentityStore, ParticipantIdentity};
pub use session::{
    ClaimEngine, ClaimStrategy, Item, Participant, ParticipantId, PresenceTracker, Session,
    SessionLifecycleManager, TotalInfo, TotalsInput,
};
pub use settlement::{ParticipantShare, Settlement};
pub use store::{
    FieldUpdate, JsonFileSessionStore, MemorySessionStore, SessionStore, SessionSubscription,
};
pub use view::{ViewEvent, ViewState, ViewStatus};
