//! Error types for episode-outcomes
//!
//! Per-series errors are caught at the series boundary and turned into a
//! skip; only the fatal kinds (see [`Error::is_fatal`]) abort an invocation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// episode-outcomes error types
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing (e.g. `DRLNAV_BASE_PATH` unset)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Window bounds are not a non-empty half-open range
    #[error("Invalid window [{start}, {end}): end must be greater than start")]
    InvalidWindow {
        /// Requested start
        start: i64,
        /// Requested end (exclusive)
        end: i64,
    },

    /// Zero or several log files matched a model
    #[error("Found {found} log files for {model} in {}", .dir.display())]
    Resolution {
        /// Requested model name
        model: String,
        /// Number of matching files
        found: usize,
        /// Directory that was searched
        dir: PathBuf,
    },

    /// Window selected no rows (only raised when empty windows are skipped)
    #[error("No data for episodes in window [{start}, {end})")]
    EmptyWindow {
        /// Window start
        start: i64,
        /// Window end (exclusive)
        end: i64,
    },

    /// Row-indexed window exceeds the physical length of the table
    #[error("Requested range {start} to {end} exceeds data length ({len})")]
    Range {
        /// Window start
        start: i64,
        /// Window end (exclusive)
        end: i64,
        /// Number of rows in the table
        len: usize,
    },

    /// Expected column absent after whitespace normalization
    #[error("Column `{column}` not found (available: {})", .available.join(", "))]
    Schema {
        /// Column that was looked up
        column: String,
        /// Normalized column names present in the log
        available: Vec<String>,
    },

    /// Outcome code outside the known category range
    #[error("Invalid outcome code {code} at {position}")]
    InvalidOutcome {
        /// Where the code was found (episode or row)
        position: String,
        /// Offending code
        code: i64,
    },

    /// Storage error (CSV/Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Chart rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts the whole invocation rather than a single series.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidWindow { .. } | Self::Render(_)
        )
    }
}
