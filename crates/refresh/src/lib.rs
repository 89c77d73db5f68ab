//! Periodic random-poem refresh.
//!
//! This crate provides:
//! - [`Host`]: the scheduling and publishing capability the controller needs
//! - [`TokioHost`]: a tokio-backed host for running standalone
//! - [`RefreshController`]: timer/manual refresh with a minimum-interval throttle
//! - [`ServiceCall`] and [`RefreshButton`]: the host-facing trigger surface

pub mod controller;
pub mod entities;
pub mod host;
pub mod tokio_host;

pub use controller::{RefreshController, RefreshError, RefreshOutcome};
pub use entities::{RefreshButton, ServiceCall};
pub use host::{CancelToken, Host, TimerCallback};
pub use tokio_host::TokioHost;
