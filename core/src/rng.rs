//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness for one (sample size, seed) unit flows through a single
//! SimRng seeded from the unit's seed alone. The sample size never feeds
//! into the seed, so runs with different N share their random stream up to
//! the point where the sampling itself diverges.
//!
//! Units never share an RNG, so running them on separate threads cannot
//! change any individual unit's output.

use crate::types::Seed;
use rand::{seq::index, Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;

/// The deterministic random source for one experiment unit.
pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(seed: Seed) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from Normal(mean, std_dev). A zero std_dev returns `mean`.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = self.inner.sample(StandardNormal);
        mean + std_dev * z
    }

    /// Draw `amount` distinct indices from `0..length`, in random order.
    /// `amount` is clamped to `length`.
    pub fn sample_distinct(&mut self, length: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(length);
        index::sample(&mut self.inner, length, amount).into_vec()
    }

    /// Draw `amount` distinct elements of `pool` without replacement.
    /// Returns the whole pool (shuffled) when it holds fewer than `amount`.
    pub fn choose_distinct<T: Copy>(&mut self, pool: &[T], amount: usize) -> Vec<T> {
        self.sample_distinct(pool.len(), amount)
            .into_iter()
            .map(|i| pool[i])
            .collect()
    }
}
