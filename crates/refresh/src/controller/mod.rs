//! Refresh controller: picks a random poem on a timer or on request.
//!
//! Split into focused submodules:
//! - `core`: controller struct, construction, lifecycle (initialize/teardown)
//! - `trigger`: timer fire, manual press, and the refresh itself
//! - `throttle`: minimum-interval check shared by the timer and manual paths
//! - `error`: error taxonomy and operation outcomes

mod core;
mod error;
mod throttle;
mod trigger;


pub use self::core::RefreshController;
pub use self::error::{RefreshError, RefreshOutcome};
