//! Experiment configuration.
//!
//! RULE: Configuration is immutable once a sweep starts. It is validated in
//! full before any simulation work or output happens; every component reads
//! it through a shared reference.

use crate::{
    error::{SimError, SimResult},
    types::{ProductType, Seed},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, path::Path, path::PathBuf, str::FromStr};

/// How a potential switcher picks the reviews it reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Simple random sampling over the whole population.
    #[serde(rename = "SRS")]
    Srs,
    /// Equal representation: half the sample from each product cohort.
    #[serde(rename = "ERS")]
    Ers,
}

/// Who gets to reconsider their product each period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwitchTrigger {
    /// A fresh uniform subset of floor(alpha * population) consumers.
    Random,
    /// Every consumer whose own payoff disappointed them this period.
    Endogenous,
}

/// The signal averaged per cohort when deciding whether to switch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonBasis {
    Objective,
    StarRating,
}

impl FromStr for SamplingStrategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SRS" => Ok(Self::Srs),
            "ERS" => Ok(Self::Ers),
            _     => Err(SimError::UnknownSamplingStrategy(s.to_string())),
        }
    }
}

impl FromStr for SwitchTrigger {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random"     => Ok(Self::Random),
            "endogenous" => Ok(Self::Endogenous),
            _            => Err(SimError::UnknownSwitchTrigger(s.to_string())),
        }
    }
}

impl FromStr for ComparisonBasis {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "objective" | "payoff"  => Ok(Self::Objective),
            "star" | "star_rating" => Ok(Self::StarRating),
            _                      => Err(SimError::UnknownComparisonBasis(s.to_string())),
        }
    }
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srs => f.write_str("SRS"),
            Self::Ers => f.write_str("ERS"),
        }
    }
}

/// Every run parameter of a sweep. All fields are required when loading
/// from a file; `Default` reproduces the reference experiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    pub num_periods:      u64,
    pub seeds:            Vec<Seed>,
    pub population_size:  usize,
    pub high_payoff:      f64,
    pub low_payoff:       f64,
    pub shock_std_dev:    f64,
    /// Review sample sizes (N) to sweep, in output order.
    pub sample_sizes:     Vec<usize>,
    /// Fraction of the population drawn as potential switchers.
    pub alpha:            f64,
    /// Weight on the newest payoff in the expected-payoff average.
    pub gamma:            f64,
    /// Ascending payoff/expectation ratio cut points, one per star bucket.
    pub star_thresholds:  Vec<f64>,
    pub sampling:         SamplingStrategy,
    pub switch_trigger:   SwitchTrigger,
    pub comparison:       ComparisonBasis,
    pub output:           PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_periods:     500,
            seeds:           seeds_from_count(100),
            population_size: 500,
            high_payoff:     100.0,
            low_payoff:      75.0,
            shock_std_dev:   20.0,
            sample_sizes:    vec![2, 6, 10, 16, 24, 50, 100, 200],
            alpha:           0.1,
            gamma:           0.5,
            star_thresholds: vec![0.8, 0.95, 1.05, 1.2, 1.35],
            sampling:        SamplingStrategy::Srs,
            switch_trigger:  SwitchTrigger::Random,
            comparison:      ComparisonBasis::Objective,
            output:          PathBuf::from("result_srs.csv"),
        }
    }
}

/// Seeds `0..count`, the reference experiment's seed set.
pub fn seeds_from_count(count: u64) -> Vec<Seed> {
    (0..count).collect()
}

impl ExperimentConfig {
    /// Load a JSON configuration file and validate it.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON configuration file without validating it. Callers that
    /// patch fields afterwards must validate the final value themselves.
    pub fn load_unvalidated(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimError::Other(anyhow::anyhow!("Cannot read {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Base payoff for a product before the idiosyncratic shock.
    pub fn base_payoff(&self, product: ProductType) -> f64 {
        match product {
            ProductType::High => self.high_payoff,
            ProductType::Low  => self.low_payoff,
        }
    }

    /// Number of potential switchers drawn per period under the random trigger.
    pub fn switchers_per_period(&self) -> usize {
        (self.alpha * self.population_size as f64).floor() as usize
    }

    /// Total records a full sweep emits.
    pub fn expected_record_count(&self) -> usize {
        self.sample_sizes.len() * self.seeds.len() * self.num_periods as usize
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.num_periods == 0 {
            return Err(SimError::config("num_periods", "must be at least 1"));
        }
        if self.population_size == 0 {
            return Err(SimError::config("population_size", "must be at least 1"));
        }
        if self.seeds.is_empty() {
            return Err(SimError::config("seeds", "must not be empty"));
        }
        if self.seeds.iter().collect::<HashSet<_>>().len() != self.seeds.len() {
            return Err(SimError::config("seeds", "must not contain duplicates"));
        }
        if !self.high_payoff.is_finite() || !self.low_payoff.is_finite() {
            return Err(SimError::config("high_payoff/low_payoff", "must be finite"));
        }
        if self.high_payoff <= self.low_payoff {
            return Err(SimError::config(
                "high_payoff",
                format!("({}) must exceed low_payoff ({})", self.high_payoff, self.low_payoff),
            ));
        }
        if !self.shock_std_dev.is_finite() || self.shock_std_dev < 0.0 {
            return Err(SimError::config("shock_std_dev", "must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SimError::config("alpha", format!("({}) must lie in [0, 1]", self.alpha)));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(SimError::config("gamma", format!("({}) must lie in (0, 1]", self.gamma)));
        }
        self.validate_thresholds()?;
        self.validate_sample_sizes()?;
        Ok(())
    }

    fn validate_thresholds(&self) -> SimResult<()> {
        if self.star_thresholds.is_empty() {
            return Err(SimError::config("star_thresholds", "must not be empty"));
        }
        if self.star_thresholds.iter().any(|t| !t.is_finite()) {
            return Err(SimError::config("star_thresholds", "must be finite"));
        }
        if self.star_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimError::config("star_thresholds", "must be strictly ascending"));
        }
        Ok(())
    }

    fn validate_sample_sizes(&self) -> SimResult<()> {
        if self.sample_sizes.is_empty() {
            return Err(SimError::config("sample_sizes", "must not be empty"));
        }
        if self.sample_sizes.iter().collect::<HashSet<_>>().len() != self.sample_sizes.len() {
            return Err(SimError::config("sample_sizes", "must not contain duplicates"));
        }
        for &n in &self.sample_sizes {
            if n == 0 {
                return Err(SimError::config("sample_sizes", "entries must be at least 1"));
            }
            // SRS draws N + 1 distinct ids (one spare in case the requester is drawn).
            if self.sampling == SamplingStrategy::Srs && n >= self.population_size {
                return Err(SimError::config(
                    "sample_sizes",
                    format!(
                        "entry {n} needs a population larger than N under SRS (population_size = {})",
                        self.population_size
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ExperimentConfig::default().validate().expect("default config validates");
    }

    #[test]
    fn strategy_names_parse_case_insensitively() {
        assert_eq!("srs".parse::<SamplingStrategy>().unwrap(), SamplingStrategy::Srs);
        assert_eq!("ERS".parse::<SamplingStrategy>().unwrap(), SamplingStrategy::Ers);
        assert!(matches!(
            "stratified".parse::<SamplingStrategy>(),
            Err(SimError::UnknownSamplingStrategy(name)) if name == "stratified"
        ));
    }

    #[test]
    fn switchers_per_period_floors() {
        let config = ExperimentConfig { population_size: 55, alpha: 0.1, ..Default::default() };
        assert_eq!(config.switchers_per_period(), 5);
    }
}
