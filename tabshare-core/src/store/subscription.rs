//! Scoped subscription handle

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use crate::error::StoreError;
use crate::session::Session;

type Watchers = HashMap<String, broadcast::Sender<Arc<Session>>>;

/// Broadcast senders for watched documents, keyed by session id
pub(crate) type WatcherMap = Mutex<Watchers>;

pub(crate) fn lock_watchers(watchers: &WatcherMap) -> MutexGuard<'_, Watchers> {
    watchers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Removes a document's channel once its last receiver is gone
pub(crate) struct WatchRelease {
    watchers: Weak<WatcherMap>,
    session_id: String,
}

impl WatchRelease {
    pub(crate) fn new(watchers: &Arc<WatcherMap>, session_id: impl Into<String>) -> Self {
        Self {
            watchers: Arc::downgrade(watchers),
            session_id: session_id.into(),
        }
    }
}

impl Drop for WatchRelease {
    fn drop(&mut self) {
        let Some(watchers) = self.watchers.upgrade() else {
            return;
        };
        let mut watchers = lock_watchers(&watchers);
        let idle = watchers
            .get(&self.session_id)
            .is_some_and(|tx| tx.receiver_count() == 0);
        if idle {
            watchers.remove(&self.session_id);
        }
    }
}

/// Live view of one session document
///
/// Holds a broadcast receiver; dropping the handle releases it, and the
/// document's channel goes with its last receiver, so a client that
/// navigates away never leaves a dangling listener behind.
pub struct SessionSubscription {
    session_id: String,
    initial: Option<Result<Session, StoreError>>,
    rx: broadcast::Receiver<Arc<Session>>,
    // Declared after `rx` so the receiver is gone before the release runs
    _release: WatchRelease,
}

impl SessionSubscription {
    pub(crate) fn new(
        session_id: impl Into<String>,
        initial: Result<Session, StoreError>,
        rx: broadcast::Receiver<Arc<Session>>,
        release: WatchRelease,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            initial: Some(initial),
            rx,
            _release: release,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Wait for the next document
    ///
    /// Returns `None` once the store has shut the channel. A lagging
    /// subscriber skips straight to the newest document it can see.
    pub async fn next(&mut self) -> Option<Result<Session, StoreError>> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        loop {
            match self.rx.recv().await {
                Ok(session) => return Some(Ok(Session::clone(&session))),
                Err(RecvError::Lagged(count)) => {
                    warn!(
                        session_id = %self.session_id,
                        "subscription lagged by {} updates", count
                    );
                    if let Some(latest) = self.drain_latest() {
                        return Some(Ok(latest));
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn drain_latest(&mut self) -> Option<Session> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(session) => latest = Some(session),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        latest.map(|s| Session::clone(&s))
    }
}

impl std::fmt::Debug for SessionSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSubscription")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}
