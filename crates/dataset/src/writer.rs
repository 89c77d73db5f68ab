use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use shici_core::{Record, ATTR_AUTHOR, ATTR_CONTENT1, ATTR_CONTENT2, ATTR_DYNASTY, ATTR_TITLE};
use tracing::debug;

use crate::error::Result;

/// Write records to a Parquet file at `path`, one row per record.
///
/// Creates parent directories. Returns the number of rows written.
pub fn write_dataset(records: &[Record], path: &Path) -> Result<u64> {
    let batch = records_to_batch(records)?;
    let row_count = batch.num_rows() as u64;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(Default::default()))
        .build();

    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    debug!(path = %path.display(), rows = row_count, "wrote poetry dataset");
    Ok(row_count)
}

fn records_to_batch(records: &[Record]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(ATTR_TITLE, DataType::Utf8, true),
        Field::new(ATTR_DYNASTY, DataType::Utf8, true),
        Field::new(ATTR_AUTHOR, DataType::Utf8, true),
        Field::new(ATTR_CONTENT1, DataType::Utf8, true),
        Field::new(ATTR_CONTENT2, DataType::Utf8, true),
    ]));

    let arrays = vec![
        text_array(records.iter().map(|r| r.title.as_str())),
        text_array(records.iter().map(|r| r.dynasty.as_str())),
        text_array(records.iter().map(|r| r.author.as_str())),
        text_array(records.iter().map(|r| r.content1.as_str())),
        text_array(records.iter().map(|r| r.content2.as_str())),
    ];

    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn text_array<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}
