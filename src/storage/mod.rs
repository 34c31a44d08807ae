//! Training log storage (Arrow/Parquet)
//!
//! **Append-Only Logs**:
//! - One row per episode, written by the trainer as episodes finish
//! - Read once per invocation, never updated in place
//!
//! CSV logs are read with every column as text. Trainers pad cells and
//! headers with spaces (`episode, reward, success`), so names are trimmed on
//! load and cells are trimmed when an integer view is requested.

use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the episode index column
pub const EPISODE_COLUMN: &str = "episode";

/// Training log loaded into a single Arrow record batch
#[derive(Debug, Clone)]
pub struct LogTable {
    batch: RecordBatch,
    source: Option<PathBuf>,
}

impl LogTable {
    /// Wrap an existing batch, trimming whitespace from its column names
    ///
    /// # Errors
    /// Returns error if the normalized batch cannot be rebuilt
    pub fn new(batch: RecordBatch) -> Result<Self> {
        Ok(Self {
            batch: normalize_column_names(&batch)?,
            source: None,
        })
    }

    /// Build an in-memory table of integer columns
    ///
    /// Useful for testing and benchmarking
    ///
    /// # Errors
    /// Returns error if no columns are given or their lengths differ
    pub fn from_columns(columns: Vec<(&str, Vec<i64>)>) -> Result<Self> {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Int64, false))
            .collect();
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|(_, values)| Arc::new(Int64Array::from(values)) as ArrayRef)
            .collect();

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| Error::StorageError(format!("Failed to build log table: {e}")))?;
        Self::new(batch)
    }

    /// Load a log file, choosing the reader by extension
    ///
    /// `.parquet` files go through the Parquet reader; anything else is
    /// parsed as CSV with a header row.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_parquet = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            Self::load_parquet(path)
        } else {
            Self::load_csv(path)
        }
    }

    /// Load a comma-separated log with a header row
    ///
    /// # Errors
    /// Returns error if the file cannot be opened, has no header, or a row
    /// has the wrong number of fields
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::StorageError(format!("Failed to open log file {}: {e}", path.display()))
        })?;
        let mut reader = BufReader::new(file);

        let mut header = String::new();
        reader.read_line(&mut header)?;
        let header = header.trim_end_matches(['\r', '\n']);
        if header.trim().is_empty() {
            return Err(Error::StorageError(format!(
                "Log file {} has no header row",
                path.display()
            )));
        }

        let fields: Vec<Field> = header
            .split(',')
            .map(|name| Field::new(name.trim(), DataType::Utf8, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let csv = arrow::csv::ReaderBuilder::new(Arc::clone(&schema))
            .with_header(false)
            .build(reader)
            .map_err(|e| Error::StorageError(format!("Failed to create CSV reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in csv {
            let batch = batch
                .map_err(|e| Error::StorageError(format!("Failed to read CSV rows: {e}")))?;
            batches.push(batch);
        }

        let batch = if batches.is_empty() {
            RecordBatch::new_empty(Arc::clone(&schema))
        } else {
            compute::concat_batches(&schema, &batches)
                .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))?
        };

        Ok(Self {
            batch,
            source: Some(path.to_path_buf()),
        })
    }

    /// Load a log stored as Parquet
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<Self> {
        use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::StorageError(format!("Failed to open Parquet file: {e}")))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| Error::StorageError(format!("Failed to parse Parquet file: {e}")))?;
        let schema = Arc::clone(builder.schema());

        let reader = builder
            .build()
            .map_err(|e| Error::StorageError(format!("Failed to create Parquet reader: {e}")))?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = batch
                .map_err(|e| Error::StorageError(format!("Failed to read record batch: {e}")))?;
            batches.push(batch);
        }

        let batch = if batches.is_empty() {
            RecordBatch::new_empty(Arc::clone(&schema))
        } else {
            compute::concat_batches(&schema, &batches)
                .map_err(|e| Error::StorageError(format!("Failed to combine batches: {e}")))?
        };

        let mut table = Self::new(batch)?;
        table.source = Some(path.to_path_buf());
        Ok(table)
    }

    /// Number of rows (episodes) in the log
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the log has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// File the table was loaded from, if any
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Normalized column names in schema order
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Whether a column with this (normalized) name exists
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Integer view of a column
    ///
    /// Text cells are trimmed and parsed; integral floats (`1.0`) are accepted.
    ///
    /// # Errors
    /// - [`Error::Schema`] if the column does not exist
    /// - [`Error::StorageError`] if a cell is empty or not an integer
    pub fn int_column(&self, name: &str) -> Result<Int64Array> {
        let column = self.column(name)?;
        to_int64(name, column, |i| i)
    }

    /// Integer view of rows `rows` of a column
    ///
    /// Only the selected cells are parsed, so malformed cells elsewhere in the
    /// log are not an error.
    ///
    /// # Errors
    /// - [`Error::Schema`] if the column does not exist
    /// - [`Error::StorageError`] if the range is out of bounds or a selected
    ///   cell is empty or not an integer
    pub fn int_column_rows(&self, name: &str, rows: Range<usize>) -> Result<Int64Array> {
        let column = self.column(name)?;
        if rows.end > column.len() || rows.start > rows.end {
            return Err(Error::StorageError(format!(
                "Rows {}..{} out of bounds for column `{name}` ({} rows)",
                rows.start,
                rows.end,
                column.len()
            )));
        }
        let slice = column.slice(rows.start, rows.len());
        to_int64(name, &slice, |i| rows.start + i)
    }

    /// Integer view of the rows selected by `mask`, from the first column
    /// found among `names`
    ///
    /// Only the selected cells are parsed.
    ///
    /// # Errors
    /// - [`Error::Schema`] naming the first candidate if none exists
    /// - [`Error::StorageError`] if a selected cell is empty or not an integer
    pub fn filtered_int_column(&self, names: &[&str], mask: &BooleanArray) -> Result<Int64Array> {
        let name = self.first_present(names)?;
        let column = self.column(name)?;
        let selected = compute::filter(column, mask)
            .map_err(|e| Error::StorageError(format!("Failed to apply row mask to `{name}`: {e}")))?;
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(row, keep)| keep.unwrap_or(false).then_some(row))
            .collect();
        to_int64(name, &selected, |i| positions.get(i).copied().unwrap_or(i))
    }

    /// Integer view of the first column found among `names`
    ///
    /// # Errors
    /// Returns [`Error::Schema`] naming the first candidate if none exists
    pub fn first_int_column(&self, names: &[&str]) -> Result<Int64Array> {
        self.int_column(self.first_present(names)?)
    }

    /// Episode index column
    ///
    /// # Errors
    /// Returns error if the log has no `episode` column
    pub fn episodes(&self) -> Result<Int64Array> {
        self.int_column(EPISODE_COLUMN)
    }

    /// Whether episode indices never decrease down the log
    ///
    /// # Errors
    /// Returns error if the log has no `episode` column
    pub fn is_append_ordered(&self) -> Result<bool> {
        let episodes = self.episodes()?;
        Ok(episodes.values().windows(2).all(|pair| pair[0] <= pair[1]))
    }

    /// Boolean mask of rows whose column value satisfies `predicate`
    ///
    /// # Errors
    /// Returns error if the column is missing or not integral
    pub fn mask<F: Fn(i64) -> bool>(&self, name: &str, predicate: F) -> Result<BooleanArray> {
        let values = self.int_column(name)?;
        Ok(BooleanArray::from(
            values.values().iter().map(|&v| predicate(v)).collect::<Vec<bool>>(),
        ))
    }

    fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| self.missing_column(name))
    }

    fn first_present<'n>(&self, names: &[&'n str]) -> Result<&'n str> {
        names
            .iter()
            .copied()
            .find(|name| self.has_column(name))
            .ok_or_else(|| self.missing_column(names.first().copied().unwrap_or_default()))
    }

    fn missing_column(&self, name: &str) -> Error {
        Error::Schema {
            column: name.to_string(),
            available: self.column_names(),
        }
    }
}

/// Strip surrounding whitespace from every column name
fn normalize_column_names(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    if schema.fields().iter().all(|f| f.name().trim() == f.name()) {
        return Ok(batch.clone());
    }

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_name(f.name().trim()))
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), batch.columns().to_vec())
        .map_err(|e| Error::StorageError(format!("Failed to normalize column names: {e}")))
}

/// Convert an integral, floating or text array to `Int64Array`
///
/// `row_at` maps a position in `column` back to the row of the log, for
/// error messages.
fn to_int64<F: Fn(usize) -> usize>(name: &str, column: &ArrayRef, row_at: F) -> Result<Int64Array> {
    let values = match column.data_type() {
        DataType::Utf8 => {
            let text = column
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| Error::Other("Failed to downcast to StringArray".to_string()))?;
            parse_int_cells(name, text, &row_at)?
        }
        DataType::Int64 => column
            .as_any()
            .downcast_ref::<Int64Array>()
            .ok_or_else(|| Error::Other("Failed to downcast to Int64Array".to_string()))?
            .clone(),
        dt if dt.is_integer() || dt.is_floating() => {
            let cast = compute::cast(column, &DataType::Int64)
                .map_err(|e| Error::StorageError(format!("Failed to cast `{name}`: {e}")))?;
            cast.as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| Error::Other("Failed to downcast to Int64Array".to_string()))?
                .clone()
        }
        dt => {
            return Err(Error::StorageError(format!(
                "Column `{name}` has non-numeric type {dt:?}"
            )))
        }
    };

    if let Some(i) = (0..values.len()).find(|&i| values.is_null(i)) {
        return Err(Error::StorageError(format!(
            "Column `{name}` has an empty cell at row {}",
            row_at(i)
        )));
    }

    Ok(values)
}

fn parse_int_cells<F: Fn(usize) -> usize>(
    name: &str,
    text: &StringArray,
    row_at: &F,
) -> Result<Int64Array> {
    text.iter()
        .enumerate()
        .map(|(i, cell)| match cell.map(str::trim) {
            None | Some("") => Err(Error::StorageError(format!(
                "Column `{name}` has an empty cell at row {}",
                row_at(i)
            ))),
            Some(cell) => parse_int(cell).ok_or_else(|| {
                Error::StorageError(format!(
                    "Column `{name}` has non-integer value {cell:?} at row {}",
                    row_at(i)
                ))
            }),
        })
        .collect::<Result<Vec<i64>>>()
        .map(Int64Array::from)
}

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::float_cmp)]
fn parse_int(cell: &str) -> Option<i64> {
    cell.parse::<i64>().ok().or_else(|| {
        let value: f64 = cell.parse().ok()?;
        (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_strips_column_names() {
        let file = write_log("episode, reward, success\n0, -1.5, 1\n1, 2.0, 0\n");
        let table = LogTable::load(file.path()).unwrap();

        assert_eq!(table.column_names(), vec!["episode", "reward", "success"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.int_column("success").unwrap().values().to_vec(), vec![1, 0]);
        assert_eq!(table.source(), Some(file.path()));
    }

    #[test]
    fn test_load_csv_header_only() {
        let file = write_log("episode,outcome\n");
        let table = LogTable::load(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.episodes().unwrap().len(), 0);
    }

    #[test]
    fn test_load_csv_empty_file_fails() {
        let file = write_log("");
        let result = LogTable::load(file.path());
        assert!(result.unwrap_err().to_string().contains("no header row"));
    }

    #[test]
    fn test_missing_column_lists_available() {
        let table = LogTable::from_columns(vec![("episode", vec![0, 1])]).unwrap();
        let err = table.int_column("outcome").unwrap_err();

        assert!(matches!(err, Error::Schema { ref column, .. } if column == "outcome"));
        assert!(err.to_string().contains("available: episode"));
    }

    #[test]
    fn test_first_int_column_falls_back() {
        let table =
            LogTable::from_columns(vec![("episode", vec![0]), ("success", vec![3])]).unwrap();
        let column = table.first_int_column(&["outcome", "success"]).unwrap();
        assert_eq!(column.value(0), 3);

        let err = table.first_int_column(&["outcome", "result"]).unwrap_err();
        assert!(err.to_string().contains("`outcome`"));
    }

    #[test]
    fn test_integral_float_cells_accepted() {
        let file = write_log("episode,success\n0,1.0\n1, 0.0 \n");
        let table = LogTable::load(file.path()).unwrap();
        assert_eq!(table.int_column("success").unwrap().values().to_vec(), vec![1, 0]);
    }

    #[test]
    fn test_non_integer_cell_rejected() {
        let file = write_log("episode,success\n0,0.5\n");
        let table = LogTable::load(file.path()).unwrap();
        let err = table.int_column("success").unwrap_err();
        assert!(err.to_string().contains("non-integer value \"0.5\" at row 0"));
    }

    #[test]
    fn test_normalize_batch_from_other_source() {
        let schema = Schema::new(vec![Field::new(" episode ", DataType::Int64, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from(vec![4, 5]))],
        )
        .unwrap();

        let table = LogTable::new(batch).unwrap();
        assert!(table.has_column("episode"));
        assert!(!table.has_column(" episode "));
    }

    #[test]
    fn test_append_order_detection() {
        let ordered = LogTable::from_columns(vec![("episode", vec![0, 0, 3, 7])]).unwrap();
        assert!(ordered.is_append_ordered().unwrap());

        let shuffled = LogTable::from_columns(vec![("episode", vec![0, 5, 3])]).unwrap();
        assert!(!shuffled.is_append_ordered().unwrap());
    }

    #[test]
    fn test_row_slice_parses_only_selected_cells() {
        let file = write_log("episode,success\n0,1\n1,1\n2,\n3,x\n");
        let table = LogTable::load(file.path()).unwrap();

        let flags = table.int_column_rows("success", 0..2).unwrap();
        assert_eq!(flags.values().to_vec(), vec![1, 1]);

        let err = table.int_column_rows("success", 1..4).unwrap_err();
        assert!(err.to_string().contains("empty cell at row 2"));
        assert!(table.int_column_rows("success", 2..5).is_err());
    }

    #[test]
    fn test_filtered_column_reports_log_row() {
        let file = write_log("episode,outcome\n0,1\n1,\n2,zz\n3,4\n");
        let table = LogTable::load(file.path()).unwrap();

        let keep = BooleanArray::from(vec![true, false, false, true]);
        let values = table.filtered_int_column(&["outcome"], &keep).unwrap();
        assert_eq!(values.values().to_vec(), vec![1, 4]);

        let keep = BooleanArray::from(vec![false, false, true, true]);
        let err = table.filtered_int_column(&["outcome"], &keep).unwrap_err();
        assert!(err.to_string().contains("non-integer value \"zz\" at row 2"));
    }

    #[test]
    fn test_mask() {
        let table = LogTable::from_columns(vec![("episode", vec![1, 2, 3, 4])]).unwrap();
        let mask = table.mask("episode", |e| e % 2 == 0).unwrap();
        assert_eq!(mask, BooleanArray::from(vec![false, true, false, true]));
    }
}
