//! Review sampling strategies.
//!
//! Both strategies return distinct consumer ids, never the requester's own,
//! and never more than `n` of them.
//!
//! SRS: draw N + 1 distinct ids from the whole population. The extra draw
//! is a spare: if the requester turns up among the first N it is swapped
//! for the spare, so the result is exactly N ids whenever the population
//! holds more than N consumers.
//!
//! ERS: split the population by the product each consumer holds at call
//! time, drop the requester, then draw floor(N / 2) from each cohort. A
//! cohort smaller than that contributes everyone it has, so the result can
//! fall short of N.

use crate::{
    config::SamplingStrategy,
    consumer::Consumer,
    rng::SimRng,
    types::{ConsumerId, ProductType},
};

pub fn select_review_sample(
    strategy: SamplingStrategy,
    requester: ConsumerId,
    n: usize,
    population: &[Consumer],
    rng: &mut SimRng,
) -> Vec<ConsumerId> {
    match strategy {
        SamplingStrategy::Srs => simple_random_sample(requester, n, population.len(), rng),
        SamplingStrategy::Ers => equal_representation_sample(requester, n, population, rng),
    }
}

fn simple_random_sample(
    requester: ConsumerId,
    n: usize,
    population_size: usize,
    rng: &mut SimRng,
) -> Vec<ConsumerId> {
    let mut drawn = rng.sample_distinct(population_size, n + 1);
    let spare = if drawn.len() > n { drawn.pop() } else { None };

    if let Some(pos) = drawn.iter().position(|&id| id == requester) {
        match spare {
            Some(spare) => drawn[pos] = spare,
            None => {
                drawn.remove(pos);
            }
        }
    }
    drawn
}

fn equal_representation_sample(
    requester: ConsumerId,
    n: usize,
    population: &[Consumer],
    rng: &mut SimRng,
) -> Vec<ConsumerId> {
    let (high, low) = cohorts_excluding(requester, population);
    let per_cohort = n / 2;

    let mut sample = rng.choose_distinct(&high, per_cohort);
    sample.extend(rng.choose_distinct(&low, per_cohort));
    sample
}

/// Ids of HIGH and LOW holders, in index order, without `requester`.
pub fn cohorts_excluding(
    requester: ConsumerId,
    population: &[Consumer],
) -> (Vec<ConsumerId>, Vec<ConsumerId>) {
    population
        .iter()
        .filter(|c| c.id() != requester)
        .fold((Vec::new(), Vec::new()), |(mut high, mut low), c| {
            match c.product_type() {
                ProductType::High => high.push(c.id()),
                ProductType::Low  => low.push(c.id()),
            }
            (high, low)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srs_on_tiny_population_drops_requester_without_spare() {
        let mut rng = SimRng::new(5);
        // Population of 3 cannot supply N + 1 = 4 draws.
        for _ in 0..50 {
            let sample = simple_random_sample(1, 3, 3, &mut rng);
            assert!(!sample.contains(&1));
            assert_eq!(sample.len(), 2);
        }
    }
}
