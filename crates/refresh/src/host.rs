//! Capabilities the controller borrows from its host.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use shici_core::SensorState;

/// Callback invoked on every timer period.
pub type TimerCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Scheduling and state publication provided by the host.
///
/// The host is expected to serialize callbacks for one controller; the
/// controller additionally holds its own lock for each operation.
pub trait Host: Send + Sync {
    /// Invoke `callback` every `every` until the returned token is cancelled.
    fn schedule(&self, every: Duration, callback: TimerCallback) -> CancelToken;

    /// Hand the latest sensor state to the presentation layer.
    fn publish(&self, state: &SensorState);
}

/// Unsubscribe handle for a scheduled timer.
///
/// The cancel action runs at most once: on [`cancel`](Self::cancel) or on drop,
/// whichever comes first.
pub struct CancelToken {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelToken {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the timer. Consumes the token.
    pub fn cancel(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for CancelToken {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn cancel_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let token = CancelToken::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        token.cancel();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        drop(CancelToken::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
