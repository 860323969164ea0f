//! The market engine — one (sample size, seed) unit of the experiment.
//!
//! EXECUTION ORDER per period (fixed, documented, never reordered):
//!   1. Payoff realization   every consumer, in index order
//!   2. Share recording      one ResultRecord for this period
//!   3. Switcher selection   period > 0 only
//!   4. Switching            period > 0 only, in switcher order
//!
//! RULES:
//!   - All randomness flows through the unit's own SimRng, seeded from the
//!     seed alone.
//!   - Every consumer realizes this period's payoff before anyone reads
//!     reviews, so reviews always reflect the current period.
//!   - The engine owns its population; nothing is shared across units.

use crate::{
    clock::{Phase, PeriodClock},
    config::ExperimentConfig,
    event::MarketEvent,
    population::Population,
    rng::SimRng,
    store::ResultRecord,
    types::{ConsumerId, Period, ProductType, Seed},
};

pub struct MarketEngine<'a> {
    config:      &'a ExperimentConfig,
    seed:        Seed,
    sample_size: usize,
    pub clock:   PeriodClock,
    rng:         SimRng,
    population:  Population,
    switchers:   Vec<ConsumerId>,
    switches:    usize,
    records:     Vec<ResultRecord>,
    events:      Vec<MarketEvent>,
}

impl<'a> MarketEngine<'a> {
    /// Seed the unit's RNG and build a fresh population.
    /// `config` must already be validated.
    pub fn new(config: &'a ExperimentConfig, sample_size: usize, seed: Seed) -> Self {
        let mut rng = SimRng::new(seed);
        let population = Population::initialize(config, &mut rng);

        let events = vec![MarketEvent::RunInitialized {
            seed,
            sample_size,
            population_size: population.len(),
            high_count:      population.count_of(ProductType::High),
        }];

        Self {
            config,
            seed,
            sample_size,
            clock: PeriodClock::new(config.num_periods),
            rng,
            population,
            switchers: Vec::new(),
            switches: 0,
            records: Vec::with_capacity(config.num_periods as usize),
            events,
        }
    }

    pub fn population(&self) -> &Population { &self.population }
    pub fn records(&self) -> &[ResultRecord] { &self.records }
    pub fn events(&self) -> &[MarketEvent] { &self.events }

    /// Run one phase. Returns the phase that was executed, or `Done`.
    pub fn step(&mut self) -> Phase {
        let phase = self.clock.advance();
        let period = self.clock.current_period;
        match phase {
            Phase::Init | Phase::Done => {}
            Phase::PayoffRealization => self.realize_payoffs(period),
            Phase::ShareRecording    => self.record_share(period),
            Phase::SwitchSelection   => self.select_switchers(period),
            Phase::Switching         => self.switch(period),
        }
        phase
    }

    /// Run one full period, or nothing if the unit is finished.
    /// Returns the events emitted during that period.
    pub fn step_period(&mut self) -> &[MarketEvent] {
        let start = self.events.len();
        if self.clock.is_done() {
            return &self.events[start..];
        }
        let period = match self.clock.phase {
            Phase::Init => 0,
            _           => self.clock.current_period + 1,
        };
        loop {
            let phase = self.step();
            if phase == Phase::Done {
                break;
            }
            if self.clock.current_period == period && self.period_complete(phase) {
                break;
            }
        }
        &self.events[start..]
    }

    /// Run every remaining period and hand back the unit's records.
    pub fn run(mut self) -> Vec<ResultRecord> {
        while self.step() != Phase::Done {}
        log::debug!(
            "unit seed={} N={}: {} periods, {} switches, final share {:.3}",
            self.seed,
            self.sample_size,
            self.records.len(),
            self.switches,
            self.population.compute_market_share(),
        );
        self.records
    }

    fn emit(&mut self, event: MarketEvent) {
        log::trace!("seed={} N={} {}", self.seed, self.sample_size, event.type_name());
        self.events.push(event);
    }

    fn period_complete(&self, phase: Phase) -> bool {
        match phase {
            Phase::ShareRecording => self.clock.current_period == 0,
            Phase::Switching      => true,
            _                     => false,
        }
    }

    fn realize_payoffs(&mut self, period: Period) {
        self.population.realize_payoffs(self.config, &mut self.rng);
        let total: f64 = self
            .population
            .consumers()
            .iter()
            .filter_map(|c| c.last_payoff())
            .sum();
        let mean_payoff = if self.population.is_empty() {
            0.0
        } else {
            total / self.population.len() as f64
        };
        self.emit(MarketEvent::PayoffsRealized { period, mean_payoff });
    }

    fn record_share(&mut self, period: Period) {
        let market_share = self.population.compute_market_share();
        self.records.push(ResultRecord {
            seed: self.seed,
            period,
            sample_size: self.sample_size,
            market_share,
        });
        self.emit(MarketEvent::ShareRecorded { period, market_share });
        log::trace!("seed={} N={} period={period} share={market_share:.4}", self.seed, self.sample_size);

        if period == 0 {
            self.emit(MarketEvent::PeriodCompleted { period, switches: 0 });
        }
    }

    fn select_switchers(&mut self, period: Period) {
        self.switchers = self.population.select_potential_switchers(
            self.config.switch_trigger,
            self.config.alpha,
            &mut self.rng,
        );
        self.emit(MarketEvent::SwitchersSelected {
            period,
            count: self.switchers.len(),
        });
    }

    fn switch(&mut self, period: Period) {
        let switchers = std::mem::take(&mut self.switchers);
        let outcomes = self.population.apply_switching(
            &switchers,
            self.sample_size,
            self.config,
            &mut self.rng,
        );

        let mut switches = 0;
        for outcome in outcomes.iter().filter(|o| o.switched()) {
            switches += 1;
            self.emit(MarketEvent::ConsumerSwitched {
                period,
                consumer_id: outcome.consumer_id,
                from:        outcome.from,
                to:          outcome.to,
            });
        }
        self.switches += switches;
        self.emit(MarketEvent::PeriodCompleted { period, switches });
    }
}
