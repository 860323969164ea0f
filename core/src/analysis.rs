//! Result reshaping for the plotting tool.
//!
//! A result file is reshaped into a grid indexed by
//! [sample-size index][seed index][period] and averaged over seeds.
//!
//! RULE: a grid is only built from a complete file. Every (N, seed, period)
//! combination implied by the expected dimensions must appear exactly once;
//! anything missing, repeated, or outside the grid is an error rather than
//! a silently zero-filled cell.

use crate::{
    error::{SimError, SimResult},
    store::ResultRecord,
    types::{Period, Seed},
};

/// Periods plotted by the reference analysis (1-based, as plotted).
pub const DEFAULT_PLOT_PERIODS: [Period; 6] = [10, 25, 50, 100, 200, 500];

#[derive(Debug, Clone, PartialEq)]
pub struct ResultGrid {
    sample_sizes: Vec<usize>,
    seeds:        Vec<Seed>,
    num_periods:  usize,
    shares:       Vec<f64>,
}

impl ResultGrid {
    pub fn from_records(
        records: &[ResultRecord],
        sample_sizes: &[usize],
        seeds: &[Seed],
        num_periods: Period,
    ) -> SimResult<Self> {
        let num_periods = num_periods as usize;
        let cells = sample_sizes.len() * seeds.len() * num_periods;
        let mut shares = vec![0.0; cells];
        let mut filled = vec![false; cells];

        for (i, record) in records.iter().enumerate() {
            let line = i + 1;
            let n_idx = sample_sizes
                .iter()
                .position(|&n| n == record.sample_size)
                .ok_or_else(|| SimError::UnexpectedRecord {
                    line,
                    reason: format!("unknown sample size {}", record.sample_size),
                })?;
            let seed_idx = seeds
                .iter()
                .position(|&s| s == record.seed)
                .ok_or_else(|| SimError::UnexpectedRecord {
                    line,
                    reason: format!("unknown seed {}", record.seed),
                })?;
            if record.period as usize >= num_periods {
                return Err(SimError::UnexpectedRecord {
                    line,
                    reason: format!("period {} beyond {num_periods} periods", record.period),
                });
            }

            let cell = (n_idx * seeds.len() + seed_idx) * num_periods + record.period as usize;
            if filled[cell] {
                return Err(SimError::DuplicateRecord {
                    seed:        record.seed,
                    period:      record.period,
                    sample_size: record.sample_size,
                });
            }
            filled[cell] = true;
            shares[cell] = record.market_share;
        }

        let found = filled.iter().filter(|&&f| f).count();
        if found != cells {
            return Err(SimError::IncompleteResults { expected: cells, found });
        }

        Ok(Self {
            sample_sizes: sample_sizes.to_vec(),
            seeds: seeds.to_vec(),
            num_periods,
            shares,
        })
    }

    pub fn sample_sizes(&self) -> &[usize] { &self.sample_sizes }
    pub fn seeds(&self) -> &[Seed] { &self.seeds }
    pub fn num_periods(&self) -> usize { self.num_periods }

    /// Share for one cell, by index into `sample_sizes`, `seeds` and periods.
    pub fn share(&self, n_idx: usize, seed_idx: usize, period: usize) -> Option<f64> {
        if n_idx >= self.sample_sizes.len() || seed_idx >= self.seeds.len() || period >= self.num_periods {
            return None;
        }
        self.shares
            .get((n_idx * self.seeds.len() + seed_idx) * self.num_periods + period)
            .copied()
    }

    fn cell(&self, n_idx: usize, seed_idx: usize, period: usize) -> f64 {
        self.shares[(n_idx * self.seeds.len() + seed_idx) * self.num_periods + period]
    }

    /// Mean share over seeds, as `[n_idx][period]`.
    pub fn seed_averages(&self) -> SeedAverages {
        let seeds = self.seeds.len() as f64;
        let rows = (0..self.sample_sizes.len())
            .map(|n_idx| {
                (0..self.num_periods)
                    .map(|p| {
                        (0..self.seeds.len())
                            .map(|s| self.cell(n_idx, s, p))
                            .sum::<f64>()
                            / seeds
                    })
                    .collect()
            })
            .collect();
        SeedAverages {
            sample_sizes: self.sample_sizes.clone(),
            rows,
        }
    }
}

/// Seed-averaged shares per sample size and period.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedAverages {
    pub sample_sizes: Vec<usize>,
    pub rows:         Vec<Vec<f64>>,
}

impl SeedAverages {
    /// Average share per N at plotting period `t` (1-based: `t` reads
    /// column `t - 1`). `None` if `t` is 0 or past the last period.
    pub fn at_plot_period(&self, t: Period) -> Option<Vec<f64>> {
        let column = (t as usize).checked_sub(1)?;
        self.rows
            .iter()
            .map(|row| row.get(column).copied())
            .collect()
    }
}
