//! [`DatasetStore`]: in-memory copy of the bundled poetry file.

use std::path::{Path, PathBuf};

use shici_core::DATASET_FILE;
use tracing::error;

use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::reader::read_dataset;

/// Holds the dataset loaded from a fixed file path.
///
/// A failed load leaves the store empty; callers check [`is_empty`](Self::is_empty)
/// and reload lazily.
pub struct DatasetStore {
    path: PathBuf,
    dataset: Dataset,
}

impl DatasetStore {
    /// Create an empty store for the given file. Nothing is read yet.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            dataset: Dataset::default(),
        }
    }

    /// Store for the bundled dataset file inside `install_dir`.
    pub fn bundled(install_dir: &Path) -> Self {
        Self::new(install_dir.join(DATASET_FILE))
    }

    /// Read the file on the current thread.
    ///
    /// Errors are logged here and returned; the store is left empty.
    pub fn load(&mut self) -> Result<&Dataset> {
        let result = read_dataset(&self.path);
        self.apply(result)
    }

    /// Read the file on tokio's blocking pool and apply the result.
    pub async fn load_off_thread(&mut self) -> Result<&Dataset> {
        let path = self.path.clone();
        let result = tokio::task::spawn_blocking(move || read_dataset(&path))
            .await
            .map_err(|e| DatasetError::Task(e.to_string()))
            .and_then(|r| r);
        self.apply(result)
    }

    fn apply(&mut self, result: Result<Dataset>) -> Result<&Dataset> {
        match result {
            Ok(dataset) => {
                self.dataset = dataset;
                Ok(&self.dataset)
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to load poetry dataset");
                self.dataset = Dataset::default();
                Err(e)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
