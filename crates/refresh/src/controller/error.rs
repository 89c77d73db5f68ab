//! Error types and outcomes for controller operations.

use shici_dataset::DatasetError;

/// Why a refresh could not produce a selection.
///
/// None of these escape the controller: each one is logged and flips the
/// sensor to unavailable.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    /// Dataset file missing, unreadable or malformed.
    #[error("dataset load failed: {0}")]
    Load(#[from] DatasetError),

    /// Dataset loaded but has no rows.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Picking or extracting the record failed.
    #[error("selection failed: {0}")]
    Selection(String),
}

/// Result of a controller operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A new record was selected and published.
    Refreshed { title: String },
    /// The minimum interval has not elapsed; nothing changed.
    Throttled { elapsed_hours: f64 },
    /// The refresh failed; availability is now false and the previous
    /// selection is kept.
    Unavailable { reason: String },
    /// The service call targeted another entity.
    Ignored,
    /// The controller was torn down.
    Stopped,
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}
