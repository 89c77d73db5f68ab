pub mod config;
pub mod entity;
pub mod entry;
pub mod error;

pub use config::Config;
pub use entity::*;
pub use entry::{ConfigEntry, ConfigFlow, EntryOptions, OptionsFlow};
pub use error::*;
