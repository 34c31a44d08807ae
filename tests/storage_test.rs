//! Log loading tests: CSV quirks and Parquet/CSV equivalence

use arrow::array::{Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use episode_outcomes::aggregate::{AddressingMode, Window, WindowAggregator};
use episode_outcomes::storage::LogTable;
use parquet::arrow::ArrowWriter;
use std::fs::{self, File};
use std::sync::Arc;
use tempfile::TempDir;

fn outcomes() -> (Vec<i64>, Vec<i64>) {
    let episodes: Vec<i64> = (0..200).collect();
    let codes = episodes.iter().map(|e| e % 6).collect();
    (episodes, codes)
}

fn write_csv(dir: &TempDir, name: &str, header: &str) -> std::path::PathBuf {
    let (episodes, codes) = outcomes();
    let mut contents = format!("{header}\n");
    for (episode, code) in episodes.iter().zip(&codes) {
        contents.push_str(&format!("{episode}, 0.5, {code}\n"));
    }
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn write_parquet(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let (episodes, codes) = outcomes();
    let schema = Arc::new(Schema::new(vec![
        Field::new("episode", DataType::Int64, false),
        Field::new(" success", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        Arc::clone(&schema),
        vec![Arc::new(Int64Array::from(episodes)), Arc::new(Int64Array::from(codes))],
    )
    .unwrap();

    let path = dir.path().join(name);
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

#[test]
fn test_padded_header_names_are_found() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "_train_stage4.txt", "episode , reward,  success ");

    let table = LogTable::load(&path).unwrap();
    assert!(table.has_column("episode"));
    assert!(table.has_column("success"));
    assert_eq!(table.num_rows(), 200);
}

#[test]
fn test_parquet_and_csv_aggregate_identically() {
    let dir = TempDir::new().unwrap();
    let csv = LogTable::load(write_csv(&dir, "log.txt", "episode, reward, success")).unwrap();
    let parquet = LogTable::load(write_parquet(&dir, "log.parquet")).unwrap();

    assert_eq!(parquet.column_names(), vec!["episode", "success"]);

    let window = Window::new(37, 161).unwrap();
    let episode = WindowAggregator::new(AddressingMode::EpisodeIndexed).with_uncertainty(true);
    assert_eq!(
        episode.aggregate(&csv, window).unwrap(),
        episode.aggregate(&parquet, window).unwrap()
    );

    let row = WindowAggregator::new(AddressingMode::RowIndexed);
    assert_eq!(row.aggregate(&csv, window).unwrap(), row.aggregate(&parquet, window).unwrap());
}

#[test]
fn test_ragged_row_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("log.txt");
    fs::write(&path, "episode,success\n0,1\n1,0,7\n").unwrap();

    let err = LogTable::load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Storage error"));
}

#[test]
fn test_missing_file_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let err = LogTable::load(dir.path().join("absent.txt")).unwrap_err();
    assert!(err.to_string().contains("Failed to open log file"));
}

#[test]
fn test_unordered_episodes_still_selected_by_value() {
    let table = LogTable::from_columns(vec![
        ("episode", vec![3, 1, 2, 0, 4]),
        ("outcome", vec![1, 2, 3, 4, 5]),
    ])
    .unwrap();
    assert!(!table.is_append_ordered().unwrap());

    let counts = WindowAggregator::new(AddressingMode::EpisodeIndexed)
        .aggregate(&table, Window::new(1, 3).unwrap())
        .unwrap();
    assert_eq!(counts.values(), vec![0, 0, 1, 1, 0, 0]);
}
