//! Error type for dataset reads and writes.

/// Errors that can occur while loading or writing the dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// File missing or unreadable.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not a valid Parquet file.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Column could not be decoded or converted to text.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The blocking load task panicked or was cancelled.
    #[error("Load task failed: {0}")]
    Task(String),
}

/// Result alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
