//! Cancellation and time bounds for remote calls.

use crate::error::{AlertError, Result};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Shared flag that stops a batch from starting further records.
///
/// Alerts already published when the flag is raised stay published.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Run `call`, giving up after `timeout`.
///
/// With a timeout the call runs on a helper thread. A call that overruns is
/// abandoned, not stopped: its result is discarded when it eventually lands.
/// A call that panics yields [`AlertError::Interrupted`] either way.
pub(crate) fn bounded_call<T, F>(operation: &'static str, timeout: Option<Duration>, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let Some(timeout) = timeout else {
        return panic::catch_unwind(AssertUnwindSafe(call))
            .unwrap_or(Err(AlertError::Interrupted(operation)));
    };

    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name(format!("alert-{operation}"))
        .spawn(move || {
            let _ = tx.send(call());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(AlertError::Timeout {
            operation,
            after: timeout,
        }),
        Err(RecvTimeoutError::Disconnected) => Err(AlertError::Interrupted(operation)),
    }
}
