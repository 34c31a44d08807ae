//! Multi-run comparison: series, bar layout, summary and chart rendering
//!
//! Series keep their input order; that order decides each series' bar offset
//! within a category group.

mod chart;
mod layout;

pub use chart::ComparisonChart;
pub use layout::{Bar, BarLayout, GROUP_SPAN};

use crate::aggregate::{Window, WindowAggregate};
use serde::{Deserialize, Serialize};

/// One compared model/run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    label: String,
    values: Vec<u64>,
    uncertainty: Option<Vec<f64>>,
}

impl Series {
    /// Create a series without uncertainty
    #[must_use]
    pub fn new(label: impl Into<String>, values: Vec<u64>) -> Self {
        Self {
            label: label.into(),
            values,
            uncertainty: None,
        }
    }

    /// Attach per-category error bar half-widths
    #[must_use]
    pub fn with_uncertainty(mut self, uncertainty: Vec<f64>) -> Self {
        self.uncertainty = Some(uncertainty);
        self
    }

    /// Create from an aggregation result
    #[must_use]
    pub fn from_aggregate(label: impl Into<String>, aggregate: &WindowAggregate) -> Self {
        Self {
            label: label.into(),
            values: aggregate.values(),
            uncertainty: aggregate.uncertainty(),
        }
    }

    /// Model/run label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Counts in category order
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Error bar half-widths, if any
    #[must_use]
    pub fn uncertainty(&self) -> Option<&[f64]> {
        self.uncertainty.as_deref()
    }
}

/// A requested series that could not be aggregated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSeries {
    /// Requested model/run label
    pub label: String,
    /// Why it was skipped
    pub reason: String,
}

impl SkippedSeries {
    /// Record a skip with the error that caused it
    #[must_use]
    pub fn new(label: impl Into<String>, reason: &crate::Error) -> Self {
        Self {
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}

/// Start a grouped chart over `categories` with the given series
#[must_use]
pub fn render(series: Vec<Series>, categories: Vec<String>) -> ComparisonChart {
    let mut chart = ComparisonChart::grouped(categories);
    for s in series {
        chart.push(s);
    }
    chart
}

/// Textual summary of the compared series
///
/// One header line per series naming it and the window bounds, then one line
/// per category with its count and, when present, the ± band to one decimal.
///
/// ```
/// use episode_outcomes::aggregate::Window;
/// use episode_outcomes::compare::{summarize, Series};
///
/// let series = vec![Series::new("ddpg_0", vec![7]).with_uncertainty(vec![5.29])];
/// let lines = summarize(&series, &["Success".to_string()], Window::new(200, 300).unwrap());
/// assert_eq!(lines[0], "Model ddpg_0, episodes 200-299:");
/// assert_eq!(lines[1], "             Success: 7  (±5.3)");
/// ```
#[must_use]
pub fn summarize(series: &[Series], categories: &[String], window: Window) -> Vec<String> {
    let mut lines = Vec::with_capacity(series.len() * (categories.len() + 1));
    for s in series {
        lines.push(format!(
            "Model {}, episodes {}-{}:",
            s.label(),
            window.start(),
            window.last()
        ));
        for (i, category) in categories.iter().enumerate() {
            let count = s.values().get(i).copied().unwrap_or(0);
            match s.uncertainty().and_then(|bands| bands.get(i)) {
                Some(band) => lines.push(format!("  {category:>18}: {count}  (±{band:.1})")),
                None => lines.push(format!("  {category:>18}: {count}")),
            }
        }
    }
    lines
}
