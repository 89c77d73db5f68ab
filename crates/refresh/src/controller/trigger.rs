//! Timer fire, manual press, and the refresh itself.

use chrono::{DateTime, Utc};
use rand::Rng;
use shici_core::{Record, SensorState};
use tracing::{debug, error, warn};

use super::core::{ControllerState, RefreshController};
use super::error::{RefreshError, RefreshOutcome};
use super::throttle::{self, Throttle, TIMER_TOLERANCE_MS};

impl RefreshController {
    /// Timer path: refresh if the minimum interval has elapsed, allowing the
    /// tick to land up to a minute early.
    pub async fn on_timer_fire(&self) -> RefreshOutcome {
        self.on_timer_fire_at(Utc::now()).await
    }

    /// [`on_timer_fire`](Self::on_timer_fire) with an explicit clock reading.
    pub async fn on_timer_fire_at(&self, now: DateTime<Utc>) -> RefreshOutcome {
        self.throttled_refresh(now, "timer", TIMER_TOLERANCE_MS).await
    }

    /// Manual trigger. `force_update` bypasses the interval throttle.
    pub async fn force_press(&self, force_update: bool) -> RefreshOutcome {
        self.force_press_at(force_update, Utc::now()).await
    }

    /// [`force_press`](Self::force_press) with an explicit clock reading.
    pub async fn force_press_at(&self, force_update: bool, now: DateTime<Utc>) -> RefreshOutcome {
        if !force_update {
            return self.throttled_refresh(now, "press", 0).await;
        }

        let mut state = self.state.lock().await;
        if state.stopped {
            return RefreshOutcome::Stopped;
        }
        let outcome = self.refresh_locked(&mut state, now, true).await;
        self.host.publish(&SensorState::from_selection(&state.selection));
        outcome
    }

    async fn throttled_refresh(
        &self,
        now: DateTime<Utc>,
        trigger: &str,
        tolerance_ms: i64,
    ) -> RefreshOutcome {
        let mut state = self.state.lock().await;
        if state.stopped {
            debug!(trigger, "controller stopped, ignoring trigger");
            return RefreshOutcome::Stopped;
        }

        if let Throttle::Wait { elapsed_hours } =
            throttle::check(state.selection.last_updated, now, self.min_interval_hours, tolerance_ms)
        {
            debug!(
                trigger,
                elapsed_hours,
                min_interval_hours = self.min_interval_hours,
                "refresh skipped, interval not reached"
            );
            return RefreshOutcome::Throttled { elapsed_hours };
        }

        let outcome = self.refresh_locked(&mut state, now, true).await;
        self.host.publish(&SensorState::from_selection(&state.selection));
        outcome
    }

    /// Pick a new record and apply it, or mark the sensor unavailable.
    ///
    /// An empty store is reloaded first when `reload_if_empty` is set. On
    /// failure the previous record and timestamp are kept.
    pub(super) async fn refresh_locked(
        &self,
        state: &mut ControllerState,
        now: DateTime<Utc>,
        reload_if_empty: bool,
    ) -> RefreshOutcome {
        match pick_record(state, reload_if_empty).await {
            Ok(record) => {
                debug!(title = %record.title, author = %record.author, "poem updated");
                let title = record.title.clone();
                state.selection.current = Some(record);
                state.selection.available = true;
                state.selection.last_updated = Some(now);
                RefreshOutcome::Refreshed { title }
            }
            Err(e) => {
                match &e {
                    RefreshError::Load(_) => warn!(error = %e, "refresh failed, sensor unavailable"),
                    RefreshError::EmptyDataset => warn!("poetry dataset is empty, sensor unavailable"),
                    RefreshError::Selection(_) => error!(error = %e, "refresh failed, sensor unavailable"),
                }
                state.selection.available = false;
                RefreshOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Optionally reload an empty dataset, then pick a uniformly random record.
async fn pick_record(state: &mut ControllerState, reload_if_empty: bool) -> Result<Record, RefreshError> {
    if state.store.is_empty() && reload_if_empty {
        state.store.load_off_thread().await?;
    }
    if state.store.is_empty() {
        return Err(RefreshError::EmptyDataset);
    }

    let dataset = state.store.dataset();
    let len = dataset.len();
    let index = state.rng.gen_range(0..len);
    dataset
        .get(index)
        .cloned()
        .ok_or_else(|| RefreshError::Selection(format!("index {} out of range for {} records", index, len)))
}
