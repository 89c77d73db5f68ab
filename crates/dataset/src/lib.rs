//! Poem dataset storage.
//!
//! This crate provides:
//! - [`read_dataset`]: Parquet file → ordered [`Dataset`] of records
//! - [`write_dataset`]: records → Parquet file with the five named columns
//! - [`DatasetStore`]: the in-memory copy of the bundled file, reloadable

mod dataset;
mod error;
mod reader;
mod store;
mod writer;

#[cfg(test)]
mod tests;

pub use dataset::Dataset;
pub use error::{DatasetError, Result};
pub use reader::read_dataset;
pub use store::DatasetStore;
pub use writer::write_dataset;
