//! Per-unit event stream.
//!
//! RULE: the engine reports what happened each period only through these
//! events and the result records. Events carry no state that the records
//! do not already imply; they exist for logging, replay checks and tests.

use crate::types::{ConsumerId, Period, ProductType, Seed};
use serde::{Deserialize, Serialize};

/// Every event emitted during a unit run.
/// Variants are append-only — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    RunInitialized {
        seed:            Seed,
        sample_size:     usize,
        population_size: usize,
        high_count:      usize,
    },
    PayoffsRealized {
        period:      Period,
        mean_payoff: f64,
    },
    ShareRecorded {
        period:       Period,
        market_share: f64,
    },
    SwitchersSelected {
        period: Period,
        count:  usize,
    },
    ConsumerSwitched {
        period:      Period,
        consumer_id: ConsumerId,
        from:        ProductType,
        to:          ProductType,
    },
    PeriodCompleted {
        period:   Period,
        switches: usize,
    },
}

impl MarketEvent {
    /// Stable name of the variant, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }    => "run_initialized",
            Self::PayoffsRealized { .. }   => "payoffs_realized",
            Self::ShareRecorded { .. }     => "share_recorded",
            Self::SwitchersSelected { .. } => "switchers_selected",
            Self::ConsumerSwitched { .. }  => "consumer_switched",
            Self::PeriodCompleted { .. }   => "period_completed",
        }
    }
}
