//! Bar geometry for multi-series comparison charts
//!
//! Grouped layout, N series over C categories:
//!
//! ```text
//! width      = 0.8 / N
//! center k,i = i + k * width
//! tick i     = i + (N - 1) * width / 2
//! ```
//!
//! Sub-bars of one group never overlap and the group stays centered under
//! its tick. The per-series layout is the degenerate case used for a single
//! scalar per series: one slot per series, bar and tick at `x = k`.

use super::Series;

/// Fraction of one category slot covered by a bar group
pub const GROUP_SPAN: f64 = 0.8;

/// Placement strategy for comparison bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    /// One group per category, one sub-bar per series
    Grouped {
        /// Number of compared series
        series: usize,
        /// Number of categories
        categories: usize,
    },
    /// One bar per series
    PerSeries {
        /// Number of compared series
        series: usize,
    },
}

/// One drawn bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Index of the series the bar belongs to
    pub series: usize,
    /// Category (grouped) or series (per-series) slot
    pub slot: usize,
    /// Horizontal center
    pub center: f64,
    /// Bar width
    pub width: f64,
    /// Bar height (count)
    pub height: u64,
    /// Symmetric error bar half-width, if any
    pub error: Option<f64>,
}

impl Bar {
    /// Left edge
    #[must_use]
    pub fn left(&self) -> f64 {
        self.center - self.width / 2.0
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.center + self.width / 2.0
    }

    /// Height as a chart coordinate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self) -> f64 {
        self.height as f64
    }

    /// Highest point drawn, including the error bar
    #[must_use]
    pub fn top(&self) -> f64 {
        self.value() + self.error.unwrap_or(0.0)
    }
}

impl BarLayout {
    /// Number of compared series
    #[must_use]
    pub const fn series(&self) -> usize {
        match self {
            Self::Grouped { series, .. } | Self::PerSeries { series } => *series,
        }
    }

    /// Number of labelled slots on the x axis
    #[must_use]
    pub const fn slots(&self) -> usize {
        match self {
            Self::Grouped { categories, .. } => *categories,
            Self::PerSeries { series } => *series,
        }
    }

    /// Width of one bar
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bar_width(&self) -> f64 {
        GROUP_SPAN / self.series().max(1) as f64
    }

    /// Center of the bar for series `series` in slot `slot`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self, series: usize, slot: usize) -> f64 {
        match self {
            Self::Grouped { .. } => slot as f64 + series as f64 * self.bar_width(),
            Self::PerSeries { .. } => series as f64,
        }
    }

    /// Tick position of a slot
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tick(&self, slot: usize) -> f64 {
        match self {
            Self::Grouped { series, .. } => {
                slot as f64 + series.saturating_sub(1) as f64 * self.bar_width() / 2.0
            }
            Self::PerSeries { .. } => slot as f64,
        }
    }

    /// Bars for every series, in series order then slot order
    ///
    /// Missing values draw as zero-height bars; error bars only appear where
    /// the series carries an uncertainty value.
    #[must_use]
    pub fn bars(&self, series: &[Series]) -> Vec<Bar> {
        let width = self.bar_width();
        series
            .iter()
            .enumerate()
            .flat_map(|(k, s)| {
                let slots: Vec<usize> = match self {
                    Self::Grouped { categories, .. } => (0..*categories).collect(),
                    Self::PerSeries { .. } => vec![k],
                };
                slots.into_iter().enumerate().map(move |(value_index, slot)| Bar {
                    series: k,
                    slot,
                    center: self.center(k, slot),
                    width,
                    height: s.values().get(value_index).copied().unwrap_or(0),
                    error: s
                        .uncertainty()
                        .and_then(|bands| bands.get(value_index).copied()),
                })
            })
            .collect()
    }
}
