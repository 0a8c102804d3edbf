//! Shared session state published to interested background tasks.

use std::sync::Arc;

use tokio::sync::watch;

/// Authentication state of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Current session token, if one is held.
    pub token: Option<String>,
    /// Whether the session is marked authenticated.
    pub authenticated: bool,
}

/// Thread-safe session container with change notification.
///
/// Cheap to clone; clones publish into the same channel. Subscribers (the
/// token monitor, primarily) observe every token change and the final
/// channel closure when the last store handle is dropped.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::default());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Get a clone of the current session.
    pub fn get(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Install a token and mark the session authenticated.
    pub fn set_token(&self, token: impl Into<String>) {
        self.tx.send_replace(Session {
            token: Some(token.into()),
            authenticated: true,
        });
    }

    /// Clear the session on logout or token invalidation.
    pub fn clear(&self) {
        self.tx.send_replace(Session::default());
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
