//! Comparison pipeline: resolve → load → aggregate → compare, per model
//!
//! Models are processed strictly in request order. Any error inside one
//! model's processing skips that series with a logged reason. Only an invalid
//! window aborts the invocation; a chart that cannot be written is reported
//! next to the summary.

use crate::aggregate::{AddressingMode, Window, WindowAggregator};
use crate::compare::{render, summarize, ComparisonChart, Series, SkippedSeries};
use crate::config::{Config, Settings};
use crate::resolve::LogResolver;
use crate::storage::LogTable;
use crate::{Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Timestamp format embedded in chart file names
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%H:%M:%S";

/// Models and window bounds requested on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    /// First episode (or row) of the window
    pub start: i64,
    /// Window length, for presets without a fixed interval
    pub interval: Option<i64>,
    /// Models to compare, in bar order
    pub models: Vec<String>,
}

impl ComparisonRequest {
    /// Create a request
    #[must_use]
    pub fn new(start: i64, interval: Option<i64>, models: Vec<String>) -> Self {
        Self {
            start,
            interval,
            models,
        }
    }

    /// Window for the request under `settings`
    ///
    /// # Errors
    /// Returns [`Error::InvalidWindow`] for a non-positive interval
    pub fn window(&self, settings: &Settings) -> Result<Window> {
        let interval = settings
            .fixed_interval
            .or(self.interval)
            .ok_or_else(|| Error::Other("no window interval given".to_string()))?;
        Window::from_interval(self.start, interval)
    }
}

/// Outcome of one comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Aggregated window
    pub window: Window,
    /// Addressing mode used
    pub mode: AddressingMode,
    /// Category labels, in value order
    pub categories: Vec<String>,
    /// Series that were aggregated, in request order
    pub series: Vec<Series>,
    /// Series that were skipped, with reasons
    pub skipped: Vec<SkippedSeries>,
    /// Textual summary
    pub summary: Vec<String>,
    /// Written chart, if any
    pub chart: Option<PathBuf>,
    /// Why the chart could not be written, if rendering failed
    pub chart_error: Option<String>,
}

/// Run a comparison
///
/// The summary is always produced. A chart that cannot be written is
/// recorded in [`ComparisonReport::chart_error`] rather than discarding the
/// aggregated series.
///
/// # Errors
/// Returns [`Error::InvalidWindow`] if the window is invalid. Per-model
/// failures become skipped series.
pub fn run(config: &Config, settings: &Settings, request: &ComparisonRequest) -> Result<ComparisonReport> {
    let window = request.window(settings)?;
    let aggregator = WindowAggregator::new(settings.mode).with_uncertainty(settings.uncertainty);
    let resolver = LogResolver::new(config, settings.log_match);
    let categories = settings.categories();

    let mut series = Vec::with_capacity(request.models.len());
    let mut skipped = Vec::new();
    for model in &request.models {
        match load_series(&resolver, &aggregator, settings, model, window) {
            Ok(s) => series.push(s),
            Err(err) => {
                warn!(model = %model, error = %err, "skipping series");
                skipped.push(SkippedSeries::new(model, &err));
            }
        }
    }

    let summary = summarize(&series, &categories, window);
    let mut report = ComparisonReport {
        window,
        mode: settings.mode,
        categories,
        series,
        skipped,
        summary,
        chart: None,
        chart_error: None,
    };

    if !settings.render {
        return Ok(report);
    }
    if report.series.is_empty() {
        warn!("no series to render; chart not written");
        return Ok(report);
    }

    match write_chart(config, settings, &report, &request.models) {
        Ok(path) => {
            info!(path = %path.display(), "chart written");
            report.chart = Some(path);
        }
        Err(err) => {
            warn!(error = %err, "chart not written");
            report.chart_error = Some(err.to_string());
        }
    }
    Ok(report)
}

fn write_chart(
    config: &Config,
    settings: &Settings,
    report: &ComparisonReport,
    models: &[String],
) -> Result<PathBuf> {
    let chart = match settings.mode {
        AddressingMode::EpisodeIndexed => render(report.series.clone(), report.categories.clone()),
        AddressingMode::RowIndexed => {
            let mut chart = ComparisonChart::per_series("Number of Successes");
            for s in &report.series {
                chart.push(s.clone());
            }
            chart
        }
    }
    .with_caption(format!(
        "{} {}-{}",
        caption_prefix(settings.mode),
        report.window.start(),
        report.window.last()
    ));

    let dir = config.graph_dir();
    std::fs::create_dir_all(&dir)?;
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let path = dir.join(output_file_name(settings, report.window, models, &timestamp));
    chart.finish(&path)
}

/// Deterministic chart file name
///
/// ```
/// use episode_outcomes::aggregate::Window;
/// use episode_outcomes::config::Preset;
/// use episode_outcomes::pipeline::output_file_name;
///
/// let name = output_file_name(
///     &Preset::OutcomeBar.settings(),
///     Window::new(200, 700).unwrap(),
///     &["ddpg_0".to_string(), "examples/td3 a".to_string()],
///     "19-10-14:03:59",
/// );
/// assert_eq!(name, "outcome_bar_200_699_19-10-14:03:59__ddpg_0-examples-td3_a.png");
/// ```
#[must_use]
pub fn output_file_name(settings: &Settings, window: Window, models: &[String], timestamp: &str) -> String {
    let end = match settings.mode {
        AddressingMode::EpisodeIndexed => window.last(),
        AddressingMode::RowIndexed => window.end(),
    };
    let suffix = models.join("-").replace(' ', "_").replace('/', "-");
    format!(
        "{}_{}_{}_{}__{}.png",
        settings.file_prefix,
        window.start(),
        end,
        timestamp,
        suffix
    )
}

const fn caption_prefix(mode: AddressingMode) -> &'static str {
    match mode {
        AddressingMode::EpisodeIndexed => "Outcomes, episodes",
        AddressingMode::RowIndexed => "Successes, rows",
    }
}

fn load_series(
    resolver: &LogResolver<'_>,
    aggregator: &WindowAggregator,
    settings: &Settings,
    model: &str,
    window: Window,
) -> Result<Series> {
    let path = resolver.resolve(model)?;
    debug!(model, path = %path.display(), "loading training log");
    let table = LogTable::load(&path)?;

    if settings.mode == AddressingMode::EpisodeIndexed && !table.is_append_ordered()? {
        debug!(model, "episode indices are not in append order");
    }

    let aggregate = aggregator.aggregate(&table, window)?;
    if settings.mode == AddressingMode::EpisodeIndexed && aggregate.is_empty() {
        if settings.skip_empty {
            return Err(Error::EmptyWindow {
                start: window.start(),
                end: window.end(),
            });
        }
        info!(model, "No data for episodes {}-{}", window.start(), window.last());
    }

    Ok(Series::from_aggregate(model, &aggregate))
}
