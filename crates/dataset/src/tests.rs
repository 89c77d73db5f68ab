//! Tests for dataset reading, writing and the store.

use std::fs;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use shici_core::{Record, DATASET_FILE, UNKNOWN};
use tempfile::TempDir;

use super::*;

fn poem(title: &str, author: &str) -> Record {
    Record::from_cells(Some(title), Some("唐"), Some(author), Some("一"), Some("二"))
}

/// Write an arbitrary batch, for files that do not follow the five-column layout.
fn write_raw(path: &std::path::Path, batch: RecordBatch) {
    let file = fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

#[test]
fn write_then_read_keeps_row_order() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join(DATASET_FILE);
    let records = vec![poem("静夜思", "李白"), poem("春晓", "孟浩然"), poem("登鹳雀楼", "王之涣")];

    assert_eq!(write_dataset(&records, &path).unwrap(), 3);

    let dataset = read_dataset(&path).unwrap();
    let titles: Vec<&str> = dataset.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["静夜思", "春晓", "登鹳雀楼"]);
    assert_eq!(dataset.get(1), Some(&records[1]));
}

#[test]
fn missing_columns_and_nulls_become_placeholders() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("partial.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("标题", DataType::Utf8, true),
        Field::new("正文1", DataType::Utf8, true),
        Field::new("备注", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("静夜思"), None])),
        Arc::new(StringArray::from(vec![Some("床前明月光"), Some("白日依山尽")])),
        Arc::new(StringArray::from(vec![Some("ignored"), Some("ignored")])),
    ];
    write_raw(&path, RecordBatch::try_new(schema, columns).unwrap());

    let dataset = read_dataset(&path).unwrap();
    assert_eq!(dataset.len(), 2);

    let first = dataset.get(0).unwrap();
    assert_eq!(first.title, "静夜思");
    assert_eq!(first.dynasty, UNKNOWN);
    assert_eq!(first.author, UNKNOWN);
    assert_eq!(first.content1, "床前明月光");
    assert_eq!(first.content2, "");

    assert_eq!(dataset.get(1).unwrap().title, UNKNOWN);
}

#[test]
fn non_text_columns_are_cast_to_text() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join("numeric.parquet");

    let schema = Arc::new(Schema::new(vec![Field::new("标题", DataType::Int64, false)]));
    let columns: Vec<ArrayRef> = vec![Arc::new(Int64Array::from(vec![1949]))];
    write_raw(&path, RecordBatch::try_new(schema, columns).unwrap());

    let dataset = read_dataset(&path).unwrap();
    assert_eq!(dataset.get(0).unwrap().title, "1949");
}

#[test]
fn read_missing_file_is_io_error() {
    let dir = TempDir::new().expect("create tempdir");
    let err = read_dataset(&dir.path().join("absent.parquet")).unwrap_err();
    assert!(matches!(err, DatasetError::Io(_)));
}

#[test]
fn read_malformed_file_is_parquet_error() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join(DATASET_FILE);
    fs::write(&path, "标题,作者\n静夜思,李白\n").unwrap();

    let err = read_dataset(&path).unwrap_err();
    assert!(matches!(err, DatasetError::Parquet(_)));
}

#[test]
fn store_resolves_bundled_path() {
    let dir = TempDir::new().expect("create tempdir");
    let store = DatasetStore::bundled(dir.path());
    assert_eq!(store.path(), dir.path().join(DATASET_FILE));
    assert!(store.is_empty());
}

#[test]
fn store_load_failure_leaves_store_empty() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join(DATASET_FILE);
    write_dataset(&[poem("静夜思", "李白")], &path).unwrap();

    let mut store = DatasetStore::new(path.clone());
    assert_eq!(store.load().unwrap().len(), 1);
    assert!(!store.is_empty());

    fs::remove_file(&path).unwrap();
    assert!(store.load().is_err());
    assert!(store.is_empty());
}

#[test]
fn store_loads_empty_file_without_error() {
    let dir = TempDir::new().expect("create tempdir");
    let path = dir.path().join(DATASET_FILE);
    write_dataset(&[], &path).unwrap();

    let mut store = DatasetStore::new(path);
    assert!(store.load().unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn store_loads_off_thread() {
    let dir = TempDir::new().expect("create tempdir");
    write_dataset(&[poem("春晓", "孟浩然")], &dir.path().join(DATASET_FILE)).unwrap();

    let mut store = DatasetStore::bundled(dir.path());
    let dataset = store.load_off_thread().await.unwrap();
    assert_eq!(dataset.get(0).unwrap().author, "孟浩然");
}
