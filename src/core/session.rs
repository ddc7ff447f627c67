//! Identity source for the planner.
//!
//! The hosted backend owns authentication; this module only tracks which identity is
//! active and lets every store subscribe to changes through a `tokio::sync::watch`
//! channel.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, info};

/// The authenticated principal whose rows a store fetches and filters by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a user id issued by the backend.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(user_id.into())
    }

    /// The raw user id, as stored in each row's owner column.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Receiver half handed to subscribers.
pub type IdentityWatch = watch::Receiver<Option<Identity>>;

/// Holds the active identity and notifies subscribers when it changes.
#[derive(Debug)]
pub struct Session {
    tx: watch::Sender<Option<Identity>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a signed-out session.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// The active identity, if any.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    /// Subscribes to identity changes. The current value counts as already seen.
    #[must_use]
    pub fn subscribe(&self) -> IdentityWatch {
        self.tx.subscribe()
    }

    /// Signs in (or swaps to) `identity`. Signing in as the active identity notifies nobody.
    pub fn sign_in(&self, identity: Identity) {
        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&identity) {
                return false;
            }
            info!("Signed in as {}", identity);
            *current = Some(identity);
            true
        });
        if !changed {
            debug!("sign_in ignored, identity already active");
        }
    }

    /// Signs out. A no-op when already signed out.
    pub fn sign_out(&self) {
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                return false;
            }
            info!("Signed out {}", current.as_ref().map_or("", Identity::as_str));
            *current = None;
            true
        });
    }
}
