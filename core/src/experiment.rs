//! The experiment driver — the full sweep over sample sizes and seeds.
//!
//! A sweep is the cross product {N} x {seed}, N outermost. Each pair is an
//! independent unit with its own engine, population and RNG, so units can
//! run in any order or in parallel. Records are always emitted in
//! (N, seed, period) order, whatever the scheduling.

use crate::{
    config::ExperimentConfig,
    engine::MarketEngine,
    error::SimResult,
    store::{RecordSink, ResultRecord},
    types::Seed,
};
use rayon::prelude::*;

/// One (sample size, seed) pair of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepUnit {
    pub sample_size: usize,
    pub seed:        Seed,
}

/// End-of-sweep totals for the runner's summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    pub units:   usize,
    pub records: usize,
    /// Mean final-period HIGH share across seeds, per N in sweep order.
    pub final_share_by_sample_size: Vec<(usize, f64)>,
}

pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// Validate the configuration. Nothing runs and nothing is written
    /// if this fails.
    pub fn new(config: ExperimentConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// All units in output order.
    pub fn units(&self) -> Vec<SweepUnit> {
        self.config
            .sample_sizes
            .iter()
            .flat_map(|&sample_size| {
                self.config
                    .seeds
                    .iter()
                    .map(move |&seed| SweepUnit { sample_size, seed })
            })
            .collect()
    }

    pub fn run_unit(&self, unit: SweepUnit) -> Vec<ResultRecord> {
        MarketEngine::new(&self.config, unit.sample_size, unit.seed).run()
    }

    /// Run every unit on the current thread, streaming records to `sink`.
    pub fn run(&self, sink: &mut impl RecordSink) -> SimResult<SweepSummary> {
        let mut tracker = FinalShares::new(&self.config);
        let mut records = 0;
        let units = self.units();
        for (i, unit) in units.iter().enumerate() {
            if i % self.config.seeds.len() == 0 {
                log::info!("running {} seeds with {} reviewers", self.config.seeds.len(), unit.sample_size);
            }
            let unit_records = self.run_unit(*unit);
            records += emit(sink, &unit_records, &mut tracker)?;
        }
        sink.finish()?;
        Ok(tracker.into_summary(units.len(), records))
    }

    /// Run units across the rayon pool. Output is identical to `run`.
    pub fn run_parallel(&self, sink: &mut impl RecordSink) -> SimResult<SweepSummary> {
        let units = self.units();
        log::info!("running {} units in parallel", units.len());
        let results: Vec<Vec<ResultRecord>> = units
            .par_iter()
            .map(|unit| self.run_unit(*unit))
            .collect();

        let mut tracker = FinalShares::new(&self.config);
        let mut records = 0;
        for unit_records in &results {
            records += emit(sink, unit_records, &mut tracker)?;
        }
        sink.finish()?;
        Ok(tracker.into_summary(units.len(), records))
    }
}

fn emit(
    sink: &mut impl RecordSink,
    records: &[ResultRecord],
    tracker: &mut FinalShares,
) -> SimResult<usize> {
    for record in records {
        sink.accept(record)?;
    }
    if let Some(last) = records.last() {
        tracker.add(last);
    }
    Ok(records.len())
}

/// Accumulates final-period shares per N.
struct FinalShares {
    sums: Vec<(usize, f64, usize)>,
}

impl FinalShares {
    fn new(config: &ExperimentConfig) -> Self {
        Self {
            sums: config.sample_sizes.iter().map(|&n| (n, 0.0, 0)).collect(),
        }
    }

    fn add(&mut self, record: &ResultRecord) {
        if let Some(entry) = self.sums.iter_mut().find(|(n, _, _)| *n == record.sample_size) {
            entry.1 += record.market_share;
            entry.2 += 1;
        }
    }

    fn into_summary(self, units: usize, records: usize) -> SweepSummary {
        SweepSummary {
            units,
            records,
            final_share_by_sample_size: self
                .sums
                .into_iter()
                .filter(|(_, _, count)| *count > 0)
                .map(|(n, sum, count)| (n, sum / count as f64))
                .collect(),
        }
    }
}
