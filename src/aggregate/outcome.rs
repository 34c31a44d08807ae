//! Outcome categories and per-category count vectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of outcome categories
pub const CATEGORY_COUNT: usize = 6;

/// How an episode ended, as encoded in the training log (codes 0-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCategory {
    /// Episode ended without a recorded reason
    Unknown,
    /// Goal reached
    Success,
    /// Robot hit a wall
    CollisionWall,
    /// Robot hit an obstacle
    CollisionObstacle,
    /// Episode ran out of time
    Timeout,
    /// Robot tipped over
    Tumble,
}

impl OutcomeCategory {
    /// All categories in code order
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::Unknown,
        Self::Success,
        Self::CollisionWall,
        Self::CollisionObstacle,
        Self::Timeout,
        Self::Tumble,
    ];

    /// Integer code used in the log
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Category for a log code, or `None` if the code is out of range
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Human-readable chart label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Success => "Success",
            Self::CollisionWall => "Collision Wall",
            Self::CollisionObstacle => "Collision Obstacle",
            Self::Timeout => "Timeout",
            Self::Tumble => "Tumble",
        }
    }

    /// Labels of all categories in code order
    #[must_use]
    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.label().to_string()).collect()
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count of episodes per outcome category.
///
/// Always holds one entry per category; categories that never occur in a
/// window are present with count 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeVector([u64; CATEGORY_COUNT]);

impl OutcomeVector {
    /// Create from raw counts in code order
    #[must_use]
    pub const fn new(counts: [u64; CATEGORY_COUNT]) -> Self {
        Self(counts)
    }

    /// Count for one category
    #[must_use]
    pub const fn get(&self, category: OutcomeCategory) -> u64 {
        self.0[category.index()]
    }

    /// Counts in code order
    #[must_use]
    pub const fn as_array(&self) -> &[u64; CATEGORY_COUNT] {
        &self.0
    }

    /// Sum over all categories
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Whether every category is zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// ±2σ Poisson band for each category
    #[must_use]
    pub fn uncertainty(&self) -> UncertaintyVector {
        UncertaintyVector::from_counts(self)
    }

    pub(crate) fn increment(&mut self, category: OutcomeCategory) {
        self.0[category.index()] += 1;
    }
}

/// Symmetric ±2σ band per category under a Poisson count model (σ = √count).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UncertaintyVector([f64; CATEGORY_COUNT]);

impl UncertaintyVector {
    /// Compute `2 * sqrt(count)` elementwise
    #[must_use]
    pub fn from_counts(counts: &OutcomeVector) -> Self {
        Self(counts.0.map(poisson_band))
    }

    /// Band half-width for one category
    #[must_use]
    pub const fn get(&self, category: OutcomeCategory) -> f64 {
        self.0[category.index()]
    }

    /// Band half-widths in code order
    #[must_use]
    pub const fn as_array(&self) -> &[f64; CATEGORY_COUNT] {
        &self.0
    }
}

/// Half-width of the ±2σ band for a Poisson count
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn poisson_band(count: u64) -> f64 {
    2.0 * (count as f64).sqrt()
}
