//! Command-line front end shared by the three binaries

use crate::config::{Config, Preset};
use crate::pipeline::{self, ComparisonReport, ComparisonRequest};
use anyhow::Context;
use clap::{Args, CommandFactory, FromArgMatches, Parser};
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Flags accepted by every variant
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Host directory under the model root (defaults to $HOSTNAME)
    #[arg(long)]
    pub host: Option<String>,

    /// Print the summary without writing a chart
    #[arg(long)]
    pub no_chart: bool,

    /// Skip models whose episode window is empty instead of drawing zeros
    #[arg(long)]
    pub skip_empty: bool,

    /// Print the full report as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,
}

/// Arguments of the fixed-window outcome variants
#[derive(Debug, Clone, Parser)]
#[command(about = "Compare episode outcomes of training runs over a fixed episode window")]
pub struct FixedWindowArgs {
    /// First episode of the window
    #[arg(allow_negative_numbers = true)]
    pub start_episode: i64,

    /// Models to compare, in bar order
    #[arg(required = true)]
    pub models: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments of the explicit-interval success variant
#[derive(Debug, Clone, Parser)]
#[command(about = "Compare success counts of training runs over a row interval")]
pub struct IntervalArgs {
    /// First row of the interval
    #[arg(allow_negative_numbers = true)]
    pub start_episode: i64,

    /// Number of rows in the interval
    #[arg(allow_negative_numbers = true)]
    pub interval: i64,

    /// Models to compare, in bar order
    #[arg(required = true)]
    pub models: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Parse fixed-window arguments under the preset's binary name
///
/// # Errors
/// Returns the clap error for missing or malformed arguments
pub fn parse_fixed<I, T>(preset: Preset, args: I) -> Result<FixedWindowArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = FixedWindowArgs::command()
        .name(preset.command_name())
        .try_get_matches_from(args)?;
    FixedWindowArgs::from_arg_matches(&matches)
}

/// Parse interval arguments
///
/// # Errors
/// Returns the clap error for missing or malformed arguments
pub fn parse_interval<I, T>(args: I) -> Result<IntervalArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = IntervalArgs::command()
        .name(Preset::SuccessInterval.command_name())
        .try_get_matches_from(args)?;
    IntervalArgs::from_arg_matches(&matches)
}

/// Entry point of `outcome-bar` and `outcome-bar-v1`
#[must_use]
pub fn main_fixed(preset: Preset) -> ExitCode {
    let args = match parse_fixed(preset, std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    init_tracing();

    let request = ComparisonRequest::new(args.start_episode, None, args.models);
    finish(execute(preset, &request, &args.common))
}

/// Entry point of `success-interval`
#[must_use]
pub fn main_interval() -> ExitCode {
    let args = match parse_interval(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };
    init_tracing();

    let request = ComparisonRequest::new(args.start_episode, Some(args.interval), args.models);
    finish(execute(Preset::SuccessInterval, &request, &args.common))
}

/// Run one comparison and print its outcome
///
/// The summary is printed first; the exit code is a failure when the chart
/// could not be written or no requested model produced a series.
///
/// # Errors
/// Returns error for configuration or window failures
pub fn execute(
    preset: Preset,
    request: &ComparisonRequest,
    common: &CommonArgs,
) -> anyhow::Result<ExitCode> {
    let mut config = Config::from_env()?;
    if let Some(host) = &common.host {
        config = config.with_host(host.clone());
    }
    let settings = preset
        .settings()
        .with_render(!common.no_chart)
        .with_skip_empty(common.skip_empty);

    let report = pipeline::run(&config, &settings, request)
        .with_context(|| format!("{} failed", preset.command_name()))?;
    print_report(&report, common.json)?;

    if let Some(reason) = &report.chart_error {
        error!("chart not written: {reason}");
        return Ok(ExitCode::FAILURE);
    }
    if report.series.is_empty() {
        error!("none of the {} requested models could be aggregated", request.models.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(report: &ComparisonReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for line in &report.summary {
        println!("{line}");
    }
    if let Some(path) = &report.chart {
        println!("Saved chart to {}", path.display());
    }
    Ok(())
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn finish(result: anyhow::Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
