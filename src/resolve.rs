//! Model name → training log file

use crate::config::Config;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const LOG_MARKER: &str = "_train_";
const LOG_EXTENSION: &str = ".txt";

/// Training log file naming convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogMatch {
    /// `_train_*.txt`
    Prefixed,
    /// `*_train_*.txt`
    Embedded,
}

impl LogMatch {
    /// Whether a file name follows the convention
    #[must_use]
    pub fn matches(self, file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(LOG_EXTENSION) else {
            return false;
        };
        match self {
            Self::Prefixed => stem.starts_with(LOG_MARKER),
            Self::Embedded => stem.contains(LOG_MARKER),
        }
    }
}

/// Finds the single training log of a model
#[derive(Debug, Clone, Copy)]
pub struct LogResolver<'a> {
    config: &'a Config,
    log_match: LogMatch,
}

impl<'a> LogResolver<'a> {
    /// Create a resolver over the model directories of `config`
    #[must_use]
    pub const fn new(config: &'a Config, log_match: LogMatch) -> Self {
        Self { config, log_match }
    }

    /// All matching log files of a model, sorted by path
    ///
    /// A missing model directory yields no candidates.
    ///
    /// # Errors
    /// Returns error if the model directory exists but cannot be listed
    pub fn candidates(&self, model: &str) -> Result<Vec<PathBuf>> {
        let dir = self.config.model_dir(model);
        if !dir.is_dir() {
            debug!(model, dir = %dir.display(), "model directory not found");
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.log_match.matches(name));
            if matches && entry.file_type()?.is_file() {
                found.push(entry.path());
            }
        }
        found.sort();
        Ok(found)
    }

    /// The unique log file of a model
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] unless exactly one file matches
    pub fn resolve(&self, model: &str) -> Result<PathBuf> {
        let mut found = self.candidates(model)?;
        if found.len() == 1 {
            return Ok(found.remove(0));
        }
        Err(Error::Resolution {
            model: model.to_string(),
            found: found.len(),
            dir: self.config.model_dir(model),
        })
    }
}
