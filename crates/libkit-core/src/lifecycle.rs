//! Run lifecycle: cancellation plus one-shot cleanup
//!
//! A `RunContext` is created by the binary, handed to long-running commands,
//! and shut down from the signal handler or on normal exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

type Cleanup = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct Shared {
    shut_down: AtomicBool,
    cleanups: Mutex<Vec<Cleanup>>,
}

/// Cancellation signal and cleanup callbacks for a single run
#[derive(Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
    shared: Arc<Shared>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled when the run shuts down
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Register a callback to run on shutdown
    ///
    /// Runs immediately if the context has already shut down.
    pub fn on_cleanup<F>(&self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut cleanups = self
            .shared
            .cleanups
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if self.shared.shut_down.load(Ordering::SeqCst) {
            drop(cleanups);
            cleanup();
        } else {
            cleanups.push(Box::new(cleanup));
        }
    }

    /// Cancel the token and run every cleanup, in registration order
    ///
    /// Only the first call does anything; it returns `true`.
    pub fn shutdown(&self) -> bool {
        let cleanups = {
            let mut cleanups = self
                .shared
                .cleanups
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if self.shared.shut_down.swap(true, Ordering::SeqCst) {
                return false;
            }
            std::mem::take(&mut *cleanups)
        };

        self.token.cancel();
        for cleanup in cleanups {
            cleanup();
        }
        true
    }
}
