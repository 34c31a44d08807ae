//! Window aggregation over training logs
//!
//! Reduces one [`LogTable`] and one [`Window`] to per-category counts.
//!
//! ## Addressing Modes
//!
//! - **Episode-indexed**: rows are selected by episode *value*
//!   (`start <= episode < end`), so logs with gaps or reordered episodes
//!   still filter correctly. Produces a full [`OutcomeVector`].
//! - **Row-indexed**: rows `[start, end)` by physical position. Produces the
//!   Success count alone, the one-category projection of the same tally.
//!
//! Codes outside 0-5 are reported as [`Error::InvalidOutcome`] rather than
//! dropped, so every selected row is accounted for in the counts.

mod outcome;
mod window;

pub use outcome::{
    poisson_band, OutcomeCategory, OutcomeVector, UncertaintyVector, CATEGORY_COUNT,
};
pub use window::Window;

use crate::storage::{LogTable, EPISODE_COLUMN};
use crate::{Error, Result};
use arrow::array::{Array, Int64Array};
use arrow::compute;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome code columns, in lookup order.
///
/// Trainers write the outcome code under `success`; `outcome` wins when both
/// are present.
pub const OUTCOME_COLUMNS: [&str; 2] = ["outcome", "success"];

/// Flag column for row-indexed aggregation
pub const SUCCESS_COLUMN: &str = "success";

/// How a window addresses the rows of a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// Select by `episode` value
    EpisodeIndexed,
    /// Select by physical row position
    RowIndexed,
}

/// Result of aggregating one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WindowAggregate {
    /// Per-category counts (episode-indexed)
    Outcomes {
        /// Episodes per category
        counts: OutcomeVector,
        /// ±2σ bands, if requested
        uncertainty: Option<UncertaintyVector>,
    },
    /// Successful rows (row-indexed)
    Successes(u64),
}

impl WindowAggregate {
    /// Bar heights in category order
    #[must_use]
    pub fn values(&self) -> Vec<u64> {
        match self {
            Self::Outcomes { counts, .. } => counts.as_array().to_vec(),
            Self::Successes(count) => vec![*count],
        }
    }

    /// Error bar half-widths in category order, if computed
    #[must_use]
    pub fn uncertainty(&self) -> Option<Vec<f64>> {
        match self {
            Self::Outcomes {
                uncertainty: Some(bands),
                ..
            } => Some(bands.as_array().to_vec()),
            _ => None,
        }
    }

    /// Sum over all categories
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Outcomes { counts, .. } => counts.total(),
            Self::Successes(count) => *count,
        }
    }

    /// Whether every count is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Window aggregator for one addressing mode.
///
/// Pure: the same table and window always give the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAggregator {
    mode: AddressingMode,
    uncertainty: bool,
}

impl WindowAggregator {
    /// Create an aggregator without uncertainty bands
    #[must_use]
    pub const fn new(mode: AddressingMode) -> Self {
        Self {
            mode,
            uncertainty: false,
        }
    }

    /// Request ±2σ bands (episode-indexed mode only)
    #[must_use]
    pub const fn with_uncertainty(mut self, uncertainty: bool) -> Self {
        self.uncertainty = uncertainty;
        self
    }

    /// Addressing mode
    #[must_use]
    pub const fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Aggregate `table` over `window`
    ///
    /// # Errors
    /// - [`Error::Schema`] if a required column is missing
    /// - [`Error::Range`] if a row-indexed window runs past the table
    /// - [`Error::InvalidOutcome`] if a selected row carries an unknown code
    ///
    /// # Example
    /// ```
    /// use episode_outcomes::aggregate::{AddressingMode, Window, WindowAggregate, WindowAggregator};
    /// use episode_outcomes::storage::LogTable;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let table = LogTable::from_columns(vec![("success", vec![1, 0, 1, 1])])?;
    /// let aggregator = WindowAggregator::new(AddressingMode::RowIndexed);
    ///
    /// let result = aggregator.aggregate(&table, Window::new(1, 4)?)?;
    /// assert_eq!(result, WindowAggregate::Successes(2));
    /// # Ok(())
    /// # }
    /// ```
    pub fn aggregate(&self, table: &LogTable, window: Window) -> Result<WindowAggregate> {
        match self.mode {
            AddressingMode::EpisodeIndexed => {
                let counts = count_outcomes(table, window)?;
                let uncertainty = self.uncertainty.then(|| counts.uncertainty());
                Ok(WindowAggregate::Outcomes {
                    counts,
                    uncertainty,
                })
            }
            AddressingMode::RowIndexed => count_successes(table, window).map(WindowAggregate::Successes),
        }
    }
}

/// Count outcome codes of episodes with `start <= episode < end`
///
/// # Errors
/// Returns error if the `episode` or outcome column is missing, or a selected
/// row has an unknown outcome code
pub fn count_outcomes(table: &LogTable, window: Window) -> Result<OutcomeVector> {
    let episodes = table.episodes()?;
    let mask = table.mask(EPISODE_COLUMN, |episode| window.contains(episode))?;

    let selected_episodes = filter_i64(&episodes, &mask)?;
    let selected_outcomes = table.filtered_int_column(&OUTCOME_COLUMNS, &mask)?;

    tally(
        selected_episodes
            .values()
            .iter()
            .zip(selected_outcomes.values().iter())
            .map(|(&episode, &code)| (Position::Episode(episode), code)),
    )
}

/// Count rows `[start, end)` whose `success` flag equals the Success code
///
/// For a 0/1 flag this is the sum of the flag over the window.
///
/// # Errors
/// - [`Error::Range`] if the window runs past the end of the table
/// - [`Error::Schema`] if the `success` column is missing
/// - [`Error::InvalidOutcome`] if a flag is outside the outcome code range
pub fn count_successes(table: &LogTable, window: Window) -> Result<u64> {
    let rows = window.rows(table.num_rows())?;
    let first = rows.start;
    let selected = table.int_column_rows(SUCCESS_COLUMN, rows)?;

    let counts = tally(
        selected
            .values()
            .iter()
            .enumerate()
            .map(|(offset, &code)| (Position::Row(first + offset), code)),
    )?;
    Ok(counts.get(OutcomeCategory::Success))
}

fn filter_i64(values: &Int64Array, mask: &arrow::array::BooleanArray) -> Result<Int64Array> {
    let filtered = compute::filter(values, mask)
        .map_err(|e| Error::StorageError(format!("Failed to apply window filter: {e}")))?;
    filtered
        .as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| Error::Other("Failed to downcast to Int64Array".to_string()))
}

fn tally<I>(codes: I) -> Result<OutcomeVector>
where
    I: IntoIterator<Item = (Position, i64)>,
{
    let mut counts = OutcomeVector::default();
    for (position, code) in codes {
        let category = OutcomeCategory::from_code(code).ok_or_else(|| Error::InvalidOutcome {
            position: position.to_string(),
            code,
        })?;
        counts.increment(category);
    }
    Ok(counts)
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Episode(i64),
    Row(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Episode(episode) => write!(f, "episode {episode}"),
            Self::Row(row) => write!(f, "row {row}"),
        }
    }
}
