//! Session store abstraction and implementations
//!
//! The store exclusively owns persisted session documents. Clients read once,
//! subscribe for pushes, overwrite whole documents, or apply batches of
//! field-scoped updates that commit atomically.

mod file;
mod memory;
mod subscription;
mod traits;
mod update;

pub use file::{JsonFileSessionStore, SESSIONS_FILE};
pub use memory::{DEFAULT_CHANNEL_CAPACITY, MemorySessionStore};
pub use subscription::SessionSubscription;
pub use traits::SessionStore;
pub use update::FieldUpdate;
