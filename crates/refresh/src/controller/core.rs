//! [`RefreshController`] struct, construction and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shici_core::{Selection, SensorState};
use shici_dataset::DatasetStore;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::host::{CancelToken, Host, TimerCallback};

use super::error::{RefreshError, RefreshOutcome};

/// Owns the dataset and the published selection for one sensor.
///
/// Every operation takes the state lock for its whole duration, so timer
/// fires, manual presses and dataset loads never interleave.
pub struct RefreshController {
    pub(super) host: Arc<dyn Host>,
    pub(super) min_interval_hours: u32,
    pub(super) state: Mutex<ControllerState>,
}

pub(super) struct ControllerState {
    pub(super) store: DatasetStore,
    pub(super) selection: Selection,
    pub(super) rng: StdRng,
    /// Unsubscribe handle for the recurring timer.
    pub(super) timer: Option<CancelToken>,
    /// Set by teardown; all later operations are no-ops.
    pub(super) stopped: bool,
}

impl RefreshController {
    /// Create a controller. Nothing is loaded or scheduled until
    /// [`initialize`](Self::initialize).
    ///
    /// An interval of zero hours is raised to one.
    pub fn new(store: DatasetStore, host: Arc<dyn Host>, min_interval_hours: u32) -> Self {
        let min_interval_hours = if min_interval_hours == 0 {
            warn!("refresh interval of 0h is invalid, using 1h");
            1
        } else {
            min_interval_hours
        };
        Self {
            host,
            min_interval_hours,
            state: Mutex::new(ControllerState {
                store,
                selection: Selection::default(),
                rng: StdRng::from_entropy(),
                timer: None,
                stopped: false,
            }),
        }
    }

    /// Use a fixed RNG seed, for reproducible selections.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.state.get_mut().rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn min_interval_hours(&self) -> u32 {
        self.min_interval_hours
    }

    pub(super) fn min_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.min_interval_hours) * 3_600)
    }

    /// Snapshot of the current selection.
    pub async fn selection(&self) -> Selection {
        self.state.lock().await.selection.clone()
    }

    /// Snapshot of the current selection as the host sees it.
    pub async fn sensor_state(&self) -> SensorState {
        SensorState::from_selection(&self.state.lock().await.selection)
    }

    /// Whether a recurring timer is currently held.
    pub async fn is_scheduled(&self) -> bool {
        self.state.lock().await.timer.is_some()
    }

    /// Load the dataset, publish a first selection, and start the timer.
    pub async fn initialize(self: &Arc<Self>) -> RefreshOutcome {
        self.initialize_at(Utc::now()).await
    }

    /// [`initialize`](Self::initialize) with an explicit clock reading.
    pub async fn initialize_at(self: &Arc<Self>, now: DateTime<Utc>) -> RefreshOutcome {
        let mut state = self.state.lock().await;
        if state.stopped {
            return RefreshOutcome::Stopped;
        }

        let loaded = state.store.load_off_thread().await.map(|dataset| dataset.len());
        state.selection.last_updated = Some(now);

        let outcome = match loaded {
            // The store just read the file; refresh from what it holds.
            Ok(rows) => {
                info!(rows, "poetry dataset ready");
                self.refresh_locked(&mut state, now, false).await
            }
            // Already logged by the store.
            Err(e) => {
                state.selection.available = false;
                RefreshOutcome::Unavailable {
                    reason: RefreshError::Load(e).to_string(),
                }
            }
        };
        self.host.publish(&SensorState::from_selection(&state.selection));

        if state.timer.is_none() {
            let token = self.host.schedule(self.min_interval(), self.timer_callback());
            state.timer = Some(token);
            info!(interval_hours = self.min_interval_hours, "refresh timer scheduled");
        }

        outcome
    }

    /// Cancel the timer. Safe to call more than once.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        state.stopped = true;
        if let Some(token) = state.timer.take() {
            token.cancel();
            info!("refresh timer cancelled");
        }
    }

    /// Timer callback holding only a weak reference, so a dropped controller
    /// does not keep refreshing.
    fn timer_callback(self: &Arc<Self>) -> TimerCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move || {
            let weak = weak.clone();
            async move {
                if let Some(controller) = weak.upgrade() {
                    controller.on_timer_fire().await;
                }
            }
            .boxed()
        })
    }
}
