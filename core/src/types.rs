//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A simulation period. Period 0 is the seeding period (no switching).
pub type Period = u64;

/// A consumer's stable index into the population. Always `< population_size`.
pub type ConsumerId = usize;

/// The seed of one experiment unit.
pub type Seed = u64;

/// Star rating bucket index, `0..thresholds.len()`.
pub type StarRating = u32;

/// The two competing product variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    High,
    Low,
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("HIGH"),
            Self::Low  => f.write_str("LOW"),
        }
    }
}
