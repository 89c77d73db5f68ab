//! Host-facing trigger surface: service calls and the refresh button.

use serde::{Deserialize, Serialize};
use shici_core::{BUTTON_ENTITY_ID, BUTTON_ICON, BUTTON_NAME, SENSOR_ENTITY_ID};
use tracing::{debug, info};

use crate::controller::{RefreshController, RefreshOutcome};

/// A service call routed to the sensor by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ServiceCall {
    /// "Refresh now". Bypasses the throttle unless `force_update` is false.
    Press {
        #[serde(default = "default_force_update")]
        force_update: bool,
    },
    /// Generic entity update; only acts when `entity_id` is the sensor.
    UpdateEntity { entity_id: String },
}

fn default_force_update() -> bool {
    true
}

impl ServiceCall {
    /// Zero-argument "refresh now".
    pub fn press() -> Self {
        Self::Press { force_update: true }
    }

    pub fn update_sensor() -> Self {
        Self::UpdateEntity {
            entity_id: SENSOR_ENTITY_ID.to_string(),
        }
    }
}

impl RefreshController {
    /// Dispatch a service call to the matching operation.
    pub async fn handle_service(&self, call: ServiceCall) -> RefreshOutcome {
        match call {
            ServiceCall::Press { force_update } => self.force_press(force_update).await,
            ServiceCall::UpdateEntity { entity_id } if entity_id == SENSOR_ENTITY_ID => {
                self.force_press(true).await
            }
            ServiceCall::UpdateEntity { entity_id } => {
                debug!(entity_id = %entity_id, "update_entity for another entity, ignoring");
                RefreshOutcome::Ignored
            }
        }
    }
}

/// The companion "古诗词刷新" button.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshButton;

impl RefreshButton {
    pub fn entity_id(&self) -> &'static str {
        BUTTON_ENTITY_ID
    }

    pub fn name(&self) -> &'static str {
        BUTTON_NAME
    }

    pub fn icon(&self) -> &'static str {
        BUTTON_ICON
    }

    /// Pressing the button asks the host to update the sensor.
    pub fn press(&self) -> ServiceCall {
        info!(entity_id = BUTTON_ENTITY_ID, "refresh button pressed");
        ServiceCall::update_sensor()
    }
}
