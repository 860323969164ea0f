//! The switching policy: compare cohort averages, pick a product.
//!
//! A potential switcher reads its review sample plus its own latest
//! experience, splits them by the product each reviewer holds right now,
//! and averages the comparison metric per cohort. The outcome is one of
//! three cases:
//!   - one cohort is empty: the information is ambiguous, keep the product;
//!   - the averages tie: keep the product;
//!   - otherwise adopt the product with the strictly higher average.

use crate::{
    config::ComparisonBasis,
    consumer::Consumer,
    types::ProductType,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwitchDecision {
    /// Only one product was represented among sample + self.
    Ambiguous,
    /// Both cohorts averaged exactly the same.
    Tie,
    /// The cohort averages favour this product.
    Adopt(ProductType),
}

impl SwitchDecision {
    /// The product a consumer currently holding `current` ends up with.
    pub fn resolve(self, current: ProductType) -> ProductType {
        match self {
            Self::Adopt(product)       => product,
            Self::Ambiguous | Self::Tie => current,
        }
    }
}

impl ComparisonBasis {
    /// The value a consumer contributes to its cohort's average, or `None`
    /// if it has not realized a payoff yet.
    pub fn metric(&self, consumer: &Consumer) -> Option<f64> {
        match self {
            Self::Objective  => consumer.last_payoff(),
            Self::StarRating => consumer.last_star_rating().map(f64::from),
        }
    }
}

/// Running totals per product cohort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortTally {
    high_total: f64,
    high_count: usize,
    low_total:  f64,
    low_count:  usize,
}

impl CohortTally {
    pub fn add(&mut self, product: ProductType, value: f64) {
        match product {
            ProductType::High => {
                self.high_total += value;
                self.high_count += 1;
            }
            ProductType::Low => {
                self.low_total += value;
                self.low_count += 1;
            }
        }
    }

    /// Tally one consumer's current product and metric.
    pub fn add_consumer(&mut self, consumer: &Consumer, basis: ComparisonBasis) {
        if let Some(value) = basis.metric(consumer) {
            self.add(consumer.product_type(), value);
        }
    }

    pub fn high_average(&self) -> Option<f64> {
        (self.high_count > 0).then(|| self.high_total / self.high_count as f64)
    }

    pub fn low_average(&self) -> Option<f64> {
        (self.low_count > 0).then(|| self.low_total / self.low_count as f64)
    }

    pub fn decide(&self) -> SwitchDecision {
        let (Some(high), Some(low)) = (self.high_average(), self.low_average()) else {
            return SwitchDecision::Ambiguous;
        };
        if high > low {
            SwitchDecision::Adopt(ProductType::High)
        } else if high < low {
            SwitchDecision::Adopt(ProductType::Low)
        } else {
            SwitchDecision::Tie
        }
    }
}
