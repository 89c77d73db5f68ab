//! [`TokioHost`]: runs timers as tokio tasks and keeps the latest state in a
//! watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use shici_core::SensorState;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::host::{CancelToken, Host, TimerCallback};

/// Standalone host backed by the tokio runtime.
///
/// [`schedule`](Host::schedule) spawns a task, so it must be called from
/// inside a runtime.
pub struct TokioHost {
    state_tx: watch::Sender<Option<SensorState>>,
}

impl TokioHost {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(None);
        Self { state_tx }
    }

    /// Subscribe to published states. Starts with the latest one.
    pub fn subscribe(&self) -> watch::Receiver<Option<SensorState>> {
        self.state_tx.subscribe()
    }

    /// Most recently published state.
    pub fn latest(&self) -> Option<SensorState> {
        self.state_tx.borrow().clone()
    }
}

impl Default for TokioHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TokioHost {
    fn schedule(&self, every: Duration, callback: TimerCallback) -> CancelToken {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        // First tick one period from now, not immediately.
        let start = Instant::now() + every;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                callback().await;
            }
        });

        debug!(every_secs = every.as_secs(), "scheduled refresh timer");
        CancelToken::new(move || {
            cancelled.store(true, Ordering::Release);
            handle.abort();
        })
    }

    fn publish(&self, state: &SensorState) {
        debug!(
            entity_id = %state.entity_id,
            state = state.state.as_deref().unwrap_or("-"),
            available = state.available,
            "publishing sensor state"
        );
        self.state_tx.send_replace(Some(state.clone()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures::FutureExt;
    use shici_core::Selection;

    use super::*;

    fn counting_callback(count: &Arc<AtomicUsize>) -> TimerCallback {
        let count = Arc::clone(count);
        Arc::new(move || {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_once_per_period() {
        let host = TokioHost::new();
        let count = Arc::new(AtomicUsize::new(0));
        let _token = host.schedule(Duration::from_secs(3_600), counting_callback(&count));

        tokio::time::sleep(Duration::from_secs(3_599)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "no tick before the first period");

        tokio::time::sleep(Duration::from_secs(3_602)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_stops_firing() {
        let host = TokioHost::new();
        let count = Arc::new(AtomicUsize::new(0));
        let token = host.schedule(Duration::from_secs(60), counting_callback(&count));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        token.cancel();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_updates_latest_state() {
        let host = TokioHost::new();
        assert!(host.latest().is_none());

        let rx = host.subscribe();
        host.publish(&SensorState::from_selection(&Selection::default()));

        assert!(!host.latest().unwrap().available);
        assert!(rx.has_changed().unwrap());
    }
}
