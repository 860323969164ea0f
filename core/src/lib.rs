//! Agent-based market simulation of product choice under review regimes.
//!
//! Consumers hold a HIGH or LOW product, experience noisy payoffs, and
//! periodically reconsider their choice by reading a sample of other
//! consumers' reviews. The experiment driver sweeps review sample sizes
//! and seeds and records HIGH market share per period.

pub mod analysis;
pub mod clock;
pub mod config;
pub mod consumer;
pub mod engine;
pub mod error;
pub mod event;
pub mod experiment;
pub mod population;
pub mod rng;
pub mod sampling;
pub mod store;
pub mod switching;
pub mod types;
