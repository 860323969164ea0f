//! Consumer agent state and per-agent operations.
//!
//! Histories are append-only and always the same length: every call to
//! `realize_payoff` pushes exactly one payoff and exactly one star rating.

use crate::{
    config::{ComparisonBasis, ExperimentConfig, SamplingStrategy},
    rng::SimRng,
    sampling,
    switching::{CohortTally, SwitchDecision},
    types::{ConsumerId, ProductType, StarRating},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consumer {
    id:                  ConsumerId,
    product_type:        ProductType,
    payoff_history:      Vec<f64>,
    star_rating_history: Vec<StarRating>,
    expected_payoff:     f64,
}

impl Consumer {
    /// A consumer with no history. `expected_payoff` seeds the smoothed
    /// expectation used for the first star rating.
    pub fn new(id: ConsumerId, product_type: ProductType, expected_payoff: f64) -> Self {
        Self {
            id,
            product_type,
            payoff_history: Vec::new(),
            star_rating_history: Vec::new(),
            expected_payoff,
        }
    }

    pub fn id(&self) -> ConsumerId { self.id }
    pub fn product_type(&self) -> ProductType { self.product_type }
    pub fn expected_payoff(&self) -> f64 { self.expected_payoff }
    pub fn payoff_history(&self) -> &[f64] { &self.payoff_history }
    pub fn star_rating_history(&self) -> &[StarRating] { &self.star_rating_history }

    pub fn last_payoff(&self) -> Option<f64> {
        self.payoff_history.last().copied()
    }

    pub fn last_star_rating(&self) -> Option<StarRating> {
        self.star_rating_history.last().copied()
    }

    /// Draw this period's payoff: base payoff of the current product plus a
    /// Normal(0, shock_std_dev) shock. Rates it against the expectation held
    /// before this period, then folds it into the expectation:
    /// `expected <- gamma * payoff + (1 - gamma) * expected`.
    pub fn realize_payoff(&mut self, config: &ExperimentConfig, rng: &mut SimRng) -> f64 {
        let base = config.base_payoff(self.product_type);
        let payoff = base + rng.normal(0.0, config.shock_std_dev);
        self.record_payoff(payoff, config.gamma, &config.star_thresholds);
        payoff
    }

    /// Append an already-drawn payoff. Shared by `realize_payoff` and tests
    /// that need exact payoffs.
    pub fn record_payoff(&mut self, payoff: f64, gamma: f64, thresholds: &[f64]) {
        let expected_before = self.expected_payoff;
        self.payoff_history.push(payoff);
        self.derive_star_rating(payoff, expected_before, thresholds);
        self.expected_payoff = gamma * payoff + (1.0 - gamma) * expected_before;
    }

    fn derive_star_rating(&mut self, payoff: f64, expected_before: f64, thresholds: &[f64]) {
        let ratio = payoff_ratio(payoff, expected_before);
        self.star_rating_history.push(star_rating_for_ratio(ratio, thresholds));
    }

    /// Ids of the reviewers this consumer reads this period. Never contains
    /// `self.id`, never longer than `n`.
    pub fn select_review_sample(
        &self,
        strategy: SamplingStrategy,
        n: usize,
        population: &[Consumer],
        rng: &mut SimRng,
    ) -> Vec<ConsumerId> {
        sampling::select_review_sample(strategy, self.id, n, population, rng)
    }

    /// Compare the sampled reviewers plus this consumer's own latest
    /// experience, grouped by the product each holds right now.
    pub fn decide_switch(
        &self,
        sample_ids: &[ConsumerId],
        population: &[Consumer],
        basis: ComparisonBasis,
    ) -> SwitchDecision {
        let mut tally = CohortTally::default();
        for &id in sample_ids {
            if let Some(reviewer) = population.get(id) {
                tally.add_consumer(reviewer, basis);
            }
        }
        tally.add_consumer(self, basis);
        tally.decide()
    }

    /// Apply a decision. Returns true if the product changed.
    pub fn apply_decision(&mut self, decision: SwitchDecision) -> bool {
        let next = decision.resolve(self.product_type);
        let changed = next != self.product_type;
        self.product_type = next;
        changed
    }

    /// Stochastic dissatisfaction test for the endogenous trigger.
    ///
    /// A consumer whose latest payoff met its expectation is satisfied and
    /// draws nothing. Otherwise it reconsiders with probability
    /// `1 - last / expected`, so a deeper shortfall is likelier to trigger.
    pub fn is_dissatisfied(&self, rng: &mut SimRng) -> bool {
        let Some(last) = self.last_payoff() else {
            return false;
        };
        if last >= self.expected_payoff {
            return false;
        }
        let probability = (1.0 - payoff_ratio(last, self.expected_payoff)).clamp(0.0, 1.0);
        rng.chance(probability)
    }
}

/// `payoff / expected`. A non-positive expectation has no meaningful ratio;
/// any payoff at or above it counts as exceeding every threshold and any
/// payoff below it as missing all of them.
pub fn payoff_ratio(payoff: f64, expected: f64) -> f64 {
    if expected > 0.0 {
        payoff / expected
    } else if payoff >= expected {
        f64::INFINITY
    } else {
        f64::NEG_INFINITY
    }
}

/// Bucket a payoff ratio: the smallest index `i` with `ratio < thresholds[i]`.
/// Buckets are half-open and the last one is a catch-all, so a ratio equal
/// to (or above) the last threshold lands in the last bucket.
pub fn star_rating_for_ratio(ratio: f64, thresholds: &[f64]) -> StarRating {
    let last = thresholds.len().saturating_sub(1);
    let bucket = thresholds
        .iter()
        .position(|&upper| ratio < upper)
        .unwrap_or(last);
    bucket as StarRating
}
