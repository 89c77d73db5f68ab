use std::fs::File;
use std::path::Path;

use arrow::array::{Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use shici_core::{Record, ATTR_AUTHOR, ATTR_CONTENT1, ATTR_CONTENT2, ATTR_DYNASTY, ATTR_TITLE};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::Result;

/// Read a Parquet file into a [`Dataset`].
///
/// Columns other than the five record columns are ignored. Any column type is
/// cast to text. Absent columns and null cells become placeholders.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = RecordColumns::from_batch(&batch)?;
        for row_idx in 0..batch.num_rows() {
            records.push(columns.record(row_idx));
        }
    }

    info!(path = %path.display(), rows = records.len(), "loaded poetry dataset");
    Ok(Dataset::new(records))
}

/// The five record columns of one batch, already converted to text.
struct RecordColumns {
    title: Option<StringArray>,
    dynasty: Option<StringArray>,
    author: Option<StringArray>,
    content1: Option<StringArray>,
    content2: Option<StringArray>,
}

impl RecordColumns {
    fn from_batch(batch: &RecordBatch) -> Result<Self> {
        Ok(Self {
            title: text_column(batch, ATTR_TITLE)?,
            dynasty: text_column(batch, ATTR_DYNASTY)?,
            author: text_column(batch, ATTR_AUTHOR)?,
            content1: text_column(batch, ATTR_CONTENT1)?,
            content2: text_column(batch, ATTR_CONTENT2)?,
        })
    }

    fn record(&self, row_idx: usize) -> Record {
        Record::from_cells(
            cell(&self.title, row_idx),
            cell(&self.dynasty, row_idx),
            cell(&self.author, row_idx),
            cell(&self.content1, row_idx),
            cell(&self.content2, row_idx),
        )
    }
}

fn text_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    let Some(column) = batch.column_by_name(name) else {
        debug!(column = name, "column missing from dataset");
        return Ok(None);
    };
    let text = cast(column, &DataType::Utf8)?;
    Ok(text.as_any().downcast_ref::<StringArray>().cloned())
}

fn cell(column: &Option<StringArray>, row_idx: usize) -> Option<&str> {
    column
        .as_ref()
        .filter(|arr| !arr.is_null(row_idx))
        .map(|arr| arr.value(row_idx))
}
