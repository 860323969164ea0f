//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two sweeps, same configuration, same seeds.
//! They must produce byte-identical result files.
//! Any divergence is a blocker — do not merge until fixed.

use review_market_core::{
    config::{ComparisonBasis, ExperimentConfig, SamplingStrategy, SwitchTrigger},
    engine::MarketEngine,
    experiment::Experiment,
    store::ResultWriter,
};

fn small_config(sampling: SamplingStrategy) -> ExperimentConfig {
    ExperimentConfig {
        num_periods:     40,
        seeds:           vec![0, 1, 2],
        population_size: 120,
        sample_sizes:    vec![2, 10, 24],
        sampling,
        ..ExperimentConfig::default()
    }
}

fn run_to_bytes(config: ExperimentConfig, parallel: bool) -> Vec<u8> {
    let experiment = Experiment::new(config).expect("valid config");
    let mut writer = ResultWriter::new(Vec::new());
    if parallel {
        experiment.run_parallel(&mut writer).expect("parallel sweep");
    } else {
        experiment.run(&mut writer).expect("sweep");
    }
    writer.into_inner()
}

#[test]
fn same_config_produces_identical_result_bytes() {
    for sampling in [SamplingStrategy::Srs, SamplingStrategy::Ers] {
        let a = run_to_bytes(small_config(sampling), false);
        let b = run_to_bytes(small_config(sampling), false);
        assert!(!a.is_empty());
        assert_eq!(a, b, "{sampling} sweep output diverged between identical runs");
    }
}

#[test]
fn parallel_sweep_matches_sequential_sweep() {
    let config = ExperimentConfig {
        switch_trigger: SwitchTrigger::Endogenous,
        comparison: ComparisonBasis::StarRating,
        ..small_config(SamplingStrategy::Ers)
    };
    let sequential = run_to_bytes(config.clone(), false);
    let parallel = run_to_bytes(config, true);
    assert_eq!(
        sequential, parallel,
        "Parallel scheduling changed the record stream"
    );
}

#[test]
fn same_seed_produces_identical_event_logs() {
    let config = small_config(SamplingStrategy::Srs);
    let mut engine_a = MarketEngine::new(&config, 10, 0xDEAD_BEEF);
    let mut engine_b = MarketEngine::new(&config, 10, 0xDEAD_BEEF);
    for _ in 0..config.num_periods {
        engine_a.step_period();
        engine_b.step_period();
    }

    let log_a: Vec<String> = engine_a.events().iter().map(|e| serde_json::to_string(e).unwrap()).collect();
    let log_b: Vec<String> = engine_b.events().iter().map(|e| serde_json::to_string(e).unwrap()).collect();

    assert_eq!(log_a.len(), log_b.len(), "Event log lengths differ");
    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}");
    }
}

#[test]
fn different_seeds_produce_different_results() {
    let config = small_config(SamplingStrategy::Srs);
    let a = MarketEngine::new(&config, 10, 42).run();
    let b = MarketEngine::new(&config, 10, 99).run();

    let any_different = a
        .iter()
        .zip(b.iter())
        .any(|(x, y)| x.market_share != y.market_share);
    assert!(any_different, "Different seeds produced identical shares — seed is not being used");
}

#[test]
fn initial_population_depends_on_seed_only() {
    // The sample size must never feed the seed: period-0 shares match across N.
    let config = small_config(SamplingStrategy::Srs);
    let with_two = MarketEngine::new(&config, 2, 7).run();
    let with_twenty_four = MarketEngine::new(&config, 24, 7).run();
    assert_eq!(with_two[0].market_share, with_twenty_four[0].market_share);
}
