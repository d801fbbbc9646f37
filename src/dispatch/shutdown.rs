// src/dispatch/shutdown.rs

//! Broadcast shutdown signal for a dispatcher run.
//!
//! A run owns one [`Shutdown`]. Workers wait on it alongside the ready queue;
//! completion, callback failures and external `stop()` calls all trigger the
//! same signal. Triggering is idempotent and never blocks, no matter how many
//! workers are alive or how many of them request it at once.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::types::ShutdownCause;

#[derive(Debug, Clone)]
pub struct Shutdown {
    token: CancellationToken,
    /// Cause given by the first in-run request. Later requests do not overwrite it.
    cause: Arc<OnceLock<ShutdownCause>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Signal tied to an outer token: cancelling `parent` shuts this run down
    /// too, while requesting shutdown here leaves `parent` untouched.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self::from_token(parent.child_token())
    }

    fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            cause: Arc::new(OnceLock::new()),
        }
    }

    /// Request shutdown. Returns `true` if this call was the first request.
    pub fn request(&self, cause: ShutdownCause) -> bool {
        let first = self.cause.set(cause).is_ok();
        self.token.cancel();
        first
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been requested, from here or from a parent.
    pub async fn requested(&self) {
        self.token.cancelled().await
    }

    /// Why the run was shut down.
    ///
    /// A signal cancelled only through its parent token reports `Stopped`.
    pub fn cause(&self) -> ShutdownCause {
        match self.cause.get() {
            Some(cause) => *cause,
            None if self.token.is_cancelled() => ShutdownCause::Stopped,
            None => ShutdownCause::None,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle that stops a dispatcher from outside its run.
///
/// Stopping is permanent for that dispatcher: the current run winds down and
/// later runs stop before dispatching anything.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}
