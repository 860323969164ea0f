//! The fixed-size consumer population of one experiment unit.
//!
//! RULE: consumers are never added or removed after initialization, and
//! `consumers[i].id() == i` always holds. Only product types change.

use crate::{
    config::{ExperimentConfig, SwitchTrigger},
    consumer::Consumer,
    error::{SimError, SimResult},
    rng::SimRng,
    switching::SwitchDecision,
    types::{ConsumerId, ProductType},
};

/// What happened to one potential switcher this period.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchOutcome {
    pub consumer_id: ConsumerId,
    pub from:        ProductType,
    pub to:          ProductType,
    pub decision:    SwitchDecision,
}

impl SwitchOutcome {
    pub fn switched(&self) -> bool {
        self.from != self.to
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    consumers: Vec<Consumer>,
}

impl Population {
    /// Create `config.population_size` consumers, each independently HIGH
    /// or LOW with probability 0.5. A consumer's expectation starts at the
    /// base payoff of the product it starts with.
    pub fn initialize(config: &ExperimentConfig, rng: &mut SimRng) -> Self {
        let consumers = (0..config.population_size)
            .map(|id| {
                let product = if rng.next_f64() > 0.5 {
                    ProductType::High
                } else {
                    ProductType::Low
                };
                log::trace!("initialize consumer {id} with {product}");
                Consumer::new(id, product, config.base_payoff(product))
            })
            .collect();
        Self { consumers }
    }

    /// Wrap pre-built consumers. Ids must equal their position.
    pub fn from_consumers(consumers: Vec<Consumer>) -> SimResult<Self> {
        if let Some((pos, c)) = consumers.iter().enumerate().find(|(i, c)| c.id() != *i) {
            return Err(SimError::Other(anyhow::anyhow!(
                "consumer at position {pos} has id {}", c.id()
            )));
        }
        Ok(Self { consumers })
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }

    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    pub fn consumer(&self, id: ConsumerId) -> Option<&Consumer> {
        self.consumers.get(id)
    }

    pub fn count_of(&self, product: ProductType) -> usize {
        self.consumers.iter().filter(|c| c.product_type() == product).count()
    }

    /// Fraction of consumers currently holding HIGH. An empty population
    /// has no share and reports 0.
    pub fn compute_market_share(&self) -> f64 {
        if self.consumers.is_empty() {
            return 0.0;
        }
        self.count_of(ProductType::High) as f64 / self.consumers.len() as f64
    }

    /// Every consumer draws this period's payoff, in index order.
    pub fn realize_payoffs(&mut self, config: &ExperimentConfig, rng: &mut SimRng) {
        for consumer in &mut self.consumers {
            consumer.realize_payoff(config, rng);
        }
    }

    /// Ids eligible to reconsider their product this period.
    ///
    /// Random: floor(alpha * size) distinct ids drawn uniformly, in draw
    /// order. Endogenous: every dissatisfied consumer, in index order.
    /// Either may be empty.
    pub fn select_potential_switchers(
        &self,
        trigger: SwitchTrigger,
        alpha: f64,
        rng: &mut SimRng,
    ) -> Vec<ConsumerId> {
        match trigger {
            SwitchTrigger::Random => {
                let count = (alpha * self.consumers.len() as f64).floor() as usize;
                rng.sample_distinct(self.consumers.len(), count)
            }
            SwitchTrigger::Endogenous => self
                .consumers
                .iter()
                .filter(|c| c.is_dissatisfied(rng))
                .map(Consumer::id)
                .collect(),
        }
    }

    /// Let each switcher read a review sample and apply its decision, in
    /// the order given. Later switchers see earlier switchers' new products.
    pub fn apply_switching(
        &mut self,
        switchers: &[ConsumerId],
        sample_size: usize,
        config: &ExperimentConfig,
        rng: &mut SimRng,
    ) -> Vec<SwitchOutcome> {
        let mut outcomes = Vec::with_capacity(switchers.len());
        for &id in switchers {
            let Some(consumer) = self.consumers.get(id) else {
                log::warn!("potential switcher {id} is not in the population");
                continue;
            };
            let sample = consumer.select_review_sample(config.sampling, sample_size, &self.consumers, rng);
            let decision = consumer.decide_switch(&sample, &self.consumers, config.comparison);
            let from = consumer.product_type();

            let consumer = &mut self.consumers[id];
            consumer.apply_decision(decision);
            let to = consumer.product_type();
            if from != to {
                log::trace!("consumer {id}: {from} -> {to}");
            } else if decision == SwitchDecision::Ambiguous {
                log::trace!("consumer {id}: only one product observed");
            }

            outcomes.push(SwitchOutcome {
                consumer_id: id,
                from,
                to,
                decision,
            });
        }
        outcomes
    }
}
