//! # episode-outcomes: Windowed Outcome Aggregation for DRL Training Logs
//!
//! Reduces a training log (one row per episode, with an episode index and an
//! outcome code) to per-category counts over an episode window, and compares
//! several training runs side by side as a grouped bar chart.
//!
//! ## Pipeline
//!
//! ```text
//! Config ──> LogResolver ──> LogTable ──> WindowAggregator ──> Series ──> ComparisonChart
//!            (model → file)  (Arrow)      (counts, ±2σ)                   (PNG + summary)
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use episode_outcomes::aggregate::{AddressingMode, Window, WindowAggregator};
//! use episode_outcomes::storage::LogTable;
//!
//! let table = LogTable::from_columns(vec![
//!     ("episode", vec![0, 1, 2, 3]),
//!     ("outcome", vec![1, 1, 2, 4]),
//! ])?;
//!
//! let aggregator = WindowAggregator::new(AddressingMode::EpisodeIndexed).with_uncertainty(true);
//! let result = aggregator.aggregate(&table, Window::new(0, 3)?)?;
//! assert_eq!(result.values(), vec![0, 2, 1, 0, 0, 0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod storage;

pub use error::{Error, Result};
