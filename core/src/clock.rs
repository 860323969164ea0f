//! Period clock — owns the period counter and the per-period phase.
//!
//! PHASE ORDER (fixed, never reordered):
//!   Init
//!   per period:  PayoffRealization -> ShareRecording
//!                -> SwitchSelection -> Switching      (period > 0 only)
//!   Done         once `num_periods` periods have completed
//!
//! Period 0 skips both switching phases: it only seeds the payoff and
//! rating histories that later reviews read.

use crate::types::Period;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    PayoffRealization,
    ShareRecording,
    SwitchSelection,
    Switching,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodClock {
    pub current_period: Period,
    pub num_periods:    Period,
    pub phase:          Phase,
}

impl PeriodClock {
    pub fn new(num_periods: Period) -> Self {
        Self {
            current_period: 0,
            num_periods,
            phase: Phase::Init,
        }
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Move to the next phase and return it. Advancing past the last phase
    /// of the last period lands on `Done`, which is terminal.
    pub fn advance(&mut self) -> Phase {
        self.phase = match self.phase {
            Phase::Init if self.num_periods == 0 => Phase::Done,
            Phase::Init                          => Phase::PayoffRealization,
            Phase::PayoffRealization             => Phase::ShareRecording,
            Phase::ShareRecording if self.current_period > 0 => Phase::SwitchSelection,
            Phase::ShareRecording                => self.next_period(),
            Phase::SwitchSelection               => Phase::Switching,
            Phase::Switching                     => self.next_period(),
            Phase::Done                          => Phase::Done,
        };
        self.phase
    }

    fn next_period(&mut self) -> Phase {
        if self.current_period + 1 >= self.num_periods {
            Phase::Done
        } else {
            self.current_period += 1;
            Phase::PayoffRealization
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(num_periods: Period) -> Vec<(Period, Phase)> {
        let mut clock = PeriodClock::new(num_periods);
        let mut out = Vec::new();
        while !clock.is_done() {
            let phase = clock.advance();
            out.push((clock.current_period, phase));
        }
        out
    }

    #[test]
    fn period_zero_has_no_switch_phases() {
        assert_eq!(
            trace(1),
            vec![
                (0, Phase::PayoffRealization),
                (0, Phase::ShareRecording),
                (0, Phase::Done),
            ]
        );
    }

    #[test]
    fn later_periods_switch_after_recording() {
        let phases = trace(2);
        assert_eq!(
            &phases[2..],
            &[
                (1, Phase::PayoffRealization),
                (1, Phase::ShareRecording),
                (1, Phase::SwitchSelection),
                (1, Phase::Switching),
                (1, Phase::Done),
            ]
        );
    }

    #[test]
    fn done_is_terminal() {
        let mut clock = PeriodClock::new(0);
        assert_eq!(clock.advance(), Phase::Done);
        assert_eq!(clock.advance(), Phase::Done);
    }
}
