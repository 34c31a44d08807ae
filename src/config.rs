//! Invocation configuration
//!
//! [`Config`] is built once at process start from the environment and passed
//! to the log resolver and the pipeline. [`Preset`] enumerates the three
//! command-line variants as [`Settings`].

use crate::aggregate::{AddressingMode, OutcomeCategory};
use crate::resolve::LogMatch;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable rooting model logs and output graphs
pub const BASE_PATH_ENV: &str = "DRLNAV_BASE_PATH";

/// Environment variable naming the training host
pub const HOST_ENV: &str = "HOSTNAME";

/// Host used when neither the environment nor the system names one
pub const DEFAULT_HOST: &str = "localhost";

const MODEL_ROOT: &str = "src/turtlebot3_drl/model";
const GRAPH_DIR: &str = "util/graphs";

/// Models whose name contains this marker live directly under the model root
const SHARED_MODEL_MARKER: &str = "examples";

/// Paths for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_path: PathBuf,
    host: String,
}

impl Config {
    /// Create a config from explicit values
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            host: host.into(),
        }
    }

    /// Read the config from the process environment
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `DRLNAV_BASE_PATH` is unset or empty
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through an arbitrary variable lookup
    ///
    /// The host falls back to `/etc/hostname`, then `localhost`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the base path is unset or empty
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_path = lookup(BASE_PATH_ENV)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "{BASE_PATH_ENV} is not set; it must point at the drlnav checkout"
                ))
            })?;

        let host = resolve_host(lookup(HOST_ENV), system_hostname);
        Ok(Self::new(base_path, host))
    }

    /// Override the host used for per-host model directories
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Base path
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Host name
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Directory holding a model's training logs
    #[must_use]
    pub fn model_dir(&self, model: &str) -> PathBuf {
        let root = self.base_path.join(MODEL_ROOT);
        if model.contains(SHARED_MODEL_MARKER) {
            root.join(model)
        } else {
            root.join(&self.host).join(model)
        }
    }

    /// Directory where charts are written
    #[must_use]
    pub fn graph_dir(&self) -> PathBuf {
        self.base_path.join(GRAPH_DIR)
    }
}

/// Pick the host: explicit value, then the system name, then `localhost`
fn resolve_host<F>(explicit: Option<String>, system: F) -> String
where
    F: FnOnce() -> Option<String>,
{
    if let Some(host) = explicit.filter(|value| !value.trim().is_empty()) {
        return host.trim().to_string();
    }
    if let Some(host) = system() {
        return host;
    }
    warn!(
        "{HOST_ENV} is unset and no system hostname was found; using `{DEFAULT_HOST}` (pass --host to override)"
    );
    DEFAULT_HOST.to_string()
}

fn system_hostname() -> Option<String> {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// The three command-line variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 500-episode outcome window with ±2σ error bars
    OutcomeBar,
    /// 100-episode outcome window, no error bars
    OutcomeBarV1,
    /// Row-indexed success count over an explicit interval
    SuccessInterval,
}

impl Preset {
    /// Binary name of the variant
    #[must_use]
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::OutcomeBar => "outcome-bar",
            Self::OutcomeBarV1 => "outcome-bar-v1",
            Self::SuccessInterval => "success-interval",
        }
    }

    /// Aggregation and output settings of the variant
    #[must_use]
    pub const fn settings(self) -> Settings {
        match self {
            Self::OutcomeBar => Settings {
                mode: AddressingMode::EpisodeIndexed,
                fixed_interval: Some(500),
                uncertainty: true,
                log_match: LogMatch::Prefixed,
                file_prefix: "outcome_bar",
                skip_empty: false,
                render: true,
            },
            Self::OutcomeBarV1 => Settings {
                mode: AddressingMode::EpisodeIndexed,
                fixed_interval: Some(100),
                uncertainty: false,
                log_match: LogMatch::Prefixed,
                file_prefix: "outcome_bar",
                skip_empty: false,
                render: true,
            },
            Self::SuccessInterval => Settings {
                mode: AddressingMode::RowIndexed,
                fixed_interval: None,
                uncertainty: false,
                log_match: LogMatch::Embedded,
                file_prefix: "success_interval",
                skip_empty: false,
                render: true,
            },
        }
    }
}

/// Aggregation and output settings for one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// How windows address log rows
    pub mode: AddressingMode,
    /// Window length; `None` takes it from the request
    pub fixed_interval: Option<i64>,
    /// Compute ±2σ bands
    pub uncertainty: bool,
    /// Log file naming convention
    pub log_match: LogMatch,
    /// Output file name prefix
    pub file_prefix: &'static str,
    /// Skip series whose episode window is empty instead of drawing zeros
    pub skip_empty: bool,
    /// Write the chart image
    pub render: bool,
}

impl Settings {
    /// Toggle skipping of empty episode windows
    #[must_use]
    pub const fn with_skip_empty(mut self, skip_empty: bool) -> Self {
        self.skip_empty = skip_empty;
        self
    }

    /// Toggle chart output
    #[must_use]
    pub const fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Category labels shown on the chart and in the summary
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        match self.mode {
            AddressingMode::EpisodeIndexed => OutcomeCategory::labels(),
            AddressingMode::RowIndexed => vec!["Successes".to_string()],
        }
    }
}
