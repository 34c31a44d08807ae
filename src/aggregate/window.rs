//! Half-open episode/row windows

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open range `[start, end)` of episode indices or row positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    start: i64,
    end: i64,
}

impl Window {
    /// Create a window from explicit bounds
    ///
    /// # Errors
    /// Returns [`Error::InvalidWindow`] unless `end > start`
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create the window `[start, start + interval)`
    ///
    /// # Errors
    /// Returns [`Error::InvalidWindow`] if `interval` is not positive or the
    /// end overflows
    pub fn from_interval(start: i64, interval: i64) -> Result<Self> {
        match start.checked_add(interval) {
            Some(end) => Self::new(start, end),
            None => Err(Error::InvalidWindow {
                start,
                end: i64::MAX,
            }),
        }
    }

    /// First index in the window
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// One past the last index in the window
    #[must_use]
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Last index in the window (inclusive)
    #[must_use]
    pub const fn last(&self) -> i64 {
        self.end - 1
    }

    /// Number of indices covered
    #[must_use]
    pub const fn span(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    /// Whether `index` lies in `[start, end)`
    #[must_use]
    pub const fn contains(&self, index: i64) -> bool {
        self.start <= index && index < self.end
    }

    /// Physical row range for a table of `len` rows
    ///
    /// # Errors
    /// Returns [`Error::Range`] if the window starts before row 0 or ends
    /// past the last row
    pub fn rows(&self, len: usize) -> Result<Range<usize>> {
        let out_of_range = || Error::Range {
            start: self.start,
            end: self.end,
            len,
        };
        let start = usize::try_from(self.start).map_err(|_| out_of_range())?;
        let end = usize::try_from(self.end).map_err(|_| out_of_range())?;
        if end > len {
            return Err(out_of_range());
        }
        Ok(start..end)
    }
}
