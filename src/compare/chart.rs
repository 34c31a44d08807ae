//! Bar chart rendering (plotters bitmap backend)

use super::{BarLayout, Series};
use crate::{Error, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

const CHART_SIZE: (u32, u32) = (1600, 1000);

/// Horizontal half-extent of the plotted range around each slot
const SLOT_MARGIN: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Axis {
    Categories(Vec<String>),
    Series { metric: String },
}

/// Chart handle that accumulates series and is written exactly once.
///
/// [`finish`](Self::finish) consumes the handle, so a chart can never be
/// flushed twice or appended to after it was written.
#[derive(Debug, Clone)]
pub struct ComparisonChart {
    axis: Axis,
    caption: String,
    series: Vec<Series>,
}

impl ComparisonChart {
    /// Chart with one bar group per category
    #[must_use]
    pub fn grouped(categories: Vec<String>) -> Self {
        Self {
            axis: Axis::Categories(categories),
            caption: String::new(),
            series: Vec::new(),
        }
    }

    /// Chart with one bar per series for a single metric
    #[must_use]
    pub fn per_series(metric: impl Into<String>) -> Self {
        Self {
            axis: Axis::Series {
                metric: metric.into(),
            },
            caption: String::new(),
            series: Vec::new(),
        }
    }

    /// Set the chart caption
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Append a series; bars are offset in push order
    pub fn push(&mut self, series: Series) {
        self.series.push(series);
    }

    /// Series pushed so far
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Whether no series has been pushed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Bar layout for the current series
    #[must_use]
    pub fn layout(&self) -> BarLayout {
        match &self.axis {
            Axis::Categories(categories) => BarLayout::Grouped {
                series: self.series.len(),
                categories: categories.len(),
            },
            Axis::Series { .. } => BarLayout::PerSeries {
                series: self.series.len(),
            },
        }
    }

    /// Label under each slot tick
    #[must_use]
    pub fn slot_labels(&self) -> Vec<String> {
        match &self.axis {
            Axis::Categories(categories) => categories.clone(),
            Axis::Series { .. } => self.series.iter().map(|s| s.label().to_string()).collect(),
        }
    }

    /// Tick positions paired with their labels
    #[must_use]
    pub fn ticks(&self) -> Vec<(f64, String)> {
        let layout = self.layout();
        self.slot_labels()
            .into_iter()
            .enumerate()
            .map(|(slot, label)| (layout.tick(slot), label))
            .collect()
    }

    /// Render the chart as PNG to `path`, consuming the handle
    ///
    /// # Errors
    /// Returns [`Error::Render`] if the image cannot be drawn or written
    pub fn finish(self, path: &Path) -> Result<PathBuf> {
        self.draw(path)
            .map_err(|e| Error::Render(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), series = self.series.len(), "chart written");
        Ok(path.to_path_buf())
    }

    fn axis_descriptions(&self) -> (&str, &str) {
        match &self.axis {
            Axis::Categories(_) => ("Outcome", "Episode count"),
            Axis::Series { metric } => ("Model", metric.as_str()),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw(&self, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let layout = self.layout();
        let bars = layout.bars(&self.series);
        let labels = self.slot_labels();
        let (x_desc, y_desc) = self.axis_descriptions();

        // Shift so that slot ticks land on integer coordinates
        let offset = layout.tick(0);
        let x_range = -SLOT_MARGIN..(layout.slots().max(1) as f64 - SLOT_MARGIN);
        let y_max = bars.iter().map(super::Bar::top).fold(0.0f64, f64::max).max(1.0) * 1.1;

        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.caption, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, 0.0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(layout.slots().max(1))
            .x_label_formatter(&|x| slot_label(&labels, *x))
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(("sans-serif", 18))
            .axis_desc_style(("sans-serif", 24))
            .draw()?;

        for (k, series) in self.series.iter().enumerate() {
            let color = Palette99::pick(k).to_rgba();
            let series_bars: Vec<_> = bars.iter().filter(|bar| bar.series == k).collect();

            chart
                .draw_series(series_bars.iter().map(|bar| {
                    Rectangle::new(
                        [(bar.left() - offset, 0.0), (bar.right() - offset, bar.value())],
                        color.filled(),
                    )
                }))?
                .label(series.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled()));

            // Lower whisker is clamped to the axis; the band itself stays symmetric
            chart.draw_series(series_bars.iter().filter_map(|bar| {
                bar.error.map(|band| {
                    ErrorBar::new_vertical(
                        bar.center - offset,
                        (bar.value() - band).max(0.0),
                        bar.value(),
                        bar.value() + band,
                        BLACK.stroke_width(2),
                        10,
                    )
                })
            }))?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 20))
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Label for an x coordinate that falls exactly on a slot tick
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slot_label(labels: &[String], x: f64) -> String {
    let slot = x.round();
    if slot < 0.0 || (x - slot).abs() > 1e-6 {
        return String::new();
    }
    labels.get(slot as usize).cloned().unwrap_or_default()
}
