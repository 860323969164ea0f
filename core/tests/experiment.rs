//! Sweep driver, unit engine and configuration tests.

use review_market_core::{
    clock::Phase,
    config::{ComparisonBasis, ExperimentConfig, SamplingStrategy, SwitchTrigger},
    engine::MarketEngine,
    error::SimError,
    event::MarketEvent,
    experiment::{Experiment, SweepUnit},
    store::ResultRecord,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn single_period_run_records_period_zero_only() {
    init_logging();
    let config = ExperimentConfig {
        population_size: 500,
        num_periods: 1,
        seeds: vec![0],
        sample_sizes: vec![10],
        ..Default::default()
    };
    let experiment = Experiment::new(config.clone()).unwrap();
    let mut records: Vec<ResultRecord> = Vec::new();
    let summary = experiment.run(&mut records).unwrap();

    assert_eq!(summary.records, 1);
    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!((record.seed, record.period, record.sample_size), (0, 0, 10));
    assert!((0.0..=1.0).contains(&record.market_share));

    // Period 0 has no switching phase at all.
    let mut engine = MarketEngine::new(&config, 10, 0);
    let events = engine.step_period().to_vec();
    assert!(events.iter().any(|e| matches!(e, MarketEvent::ShareRecorded { period: 0, .. })));
    assert!(!engine
        .events()
        .iter()
        .any(|e| matches!(e, MarketEvent::SwitchersSelected { .. } | MarketEvent::ConsumerSwitched { .. })));
    assert_eq!(engine.step(), Phase::Done);
}

#[test]
fn share_is_recorded_before_switching_each_period() {
    let config = ExperimentConfig {
        population_size: 100,
        num_periods: 5,
        seeds: vec![3],
        sample_sizes: vec![6],
        ..Default::default()
    };
    let mut engine = MarketEngine::new(&config, 6, 3);
    let mut phases = Vec::new();
    loop {
        let phase = engine.step();
        phases.push(phase);
        if phase == Phase::Done {
            break;
        }
    }
    let realize = phases.iter().filter(|&&p| p == Phase::PayoffRealization).count();
    let switch_rounds = phases.iter().filter(|&&p| p == Phase::Switching).count();
    assert_eq!(realize, 5);
    assert_eq!(switch_rounds, 4, "Every period except 0 switches");

    for window in phases.windows(2) {
        if window[1] == Phase::SwitchSelection {
            assert_eq!(window[0], Phase::ShareRecording);
        }
    }
}

#[test]
fn random_trigger_selects_floor_alpha_population_every_period() {
    let config = ExperimentConfig {
        population_size: 500,
        num_periods: 12,
        alpha: 0.1,
        seeds: vec![0],
        sample_sizes: vec![10],
        ..Default::default()
    };
    let mut engine = MarketEngine::new(&config, 10, 0);
    for _ in 0..config.num_periods {
        engine.step_period();
    }
    let counts: Vec<usize> = engine
        .events()
        .iter()
        .filter_map(|e| match e {
            MarketEvent::SwitchersSelected { count, .. } => Some(*count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![50; 11]);
}

#[test]
fn histories_grow_one_entry_per_period() {
    let config = ExperimentConfig {
        population_size: 60,
        num_periods: 30,
        switch_trigger: SwitchTrigger::Endogenous,
        sampling: SamplingStrategy::Ers,
        ..Default::default()
    };
    let mut engine = MarketEngine::new(&config, 10, 5);
    for _ in 0..config.num_periods {
        engine.step_period();
    }
    for c in engine.population().consumers() {
        assert_eq!(c.payoff_history().len(), 30);
        assert_eq!(c.star_rating_history().len(), 30);
    }
}

#[test]
fn records_come_out_in_sample_size_seed_period_order() {
    let config = ExperimentConfig {
        population_size: 50,
        num_periods: 4,
        seeds: vec![5, 1],
        sample_sizes: vec![6, 2],
        ..Default::default()
    };
    let experiment = Experiment::new(config).unwrap();
    assert_eq!(
        experiment.units(),
        vec![
            SweepUnit { sample_size: 6, seed: 5 },
            SweepUnit { sample_size: 6, seed: 1 },
            SweepUnit { sample_size: 2, seed: 5 },
            SweepUnit { sample_size: 2, seed: 1 },
        ]
    );

    let mut records: Vec<ResultRecord> = Vec::new();
    let summary = experiment.run(&mut records).unwrap();
    assert_eq!(records.len(), 16);
    assert_eq!(summary.units, 4);
    assert_eq!(summary.final_share_by_sample_size.len(), 2);

    let keys: Vec<(usize, u64, u64)> = records.iter().map(|r| (r.sample_size, r.seed, r.period)).collect();
    let mut expected = Vec::new();
    for n in [6, 2] {
        for seed in [5, 1] {
            for period in 0..4 {
                expected.push((n, seed, period));
            }
        }
    }
    assert_eq!(keys, expected);
}

#[test]
fn high_quality_gains_share_under_srs() {
    // A sanity check on the mechanism: with a 25-point quality gap and
    // moderate noise, HIGH should end well above its starting share.
    let config = ExperimentConfig {
        population_size: 300,
        num_periods: 150,
        seeds: vec![0, 1, 2, 3],
        sample_sizes: vec![24],
        ..Default::default()
    };
    let experiment = Experiment::new(config).unwrap();
    let mut records: Vec<ResultRecord> = Vec::new();
    let summary = experiment.run(&mut records).unwrap();
    let (_, final_share) = summary.final_share_by_sample_size[0];
    assert!(final_share > 0.8, "HIGH final share {final_share:.3} unexpectedly low");
}

#[test]
fn invalid_configuration_fails_before_running() {
    let bad = [
        ExperimentConfig { num_periods: 0, ..Default::default() },
        ExperimentConfig { seeds: vec![], ..Default::default() },
        ExperimentConfig { alpha: 1.5, ..Default::default() },
        ExperimentConfig { gamma: 0.0, ..Default::default() },
        ExperimentConfig { star_thresholds: vec![1.0, 0.9], ..Default::default() },
        ExperimentConfig { sample_sizes: vec![], ..Default::default() },
        ExperimentConfig { population_size: 100, sample_sizes: vec![100], ..Default::default() },
        ExperimentConfig { low_payoff: 120.0, ..Default::default() },
        ExperimentConfig { shock_std_dev: -1.0, ..Default::default() },
    ];
    for config in bad {
        match Experiment::new(config.clone()) {
            Err(SimError::Config { .. }) => {}
            other => panic!("Expected a config error for {config:?}, got {:?}", other.err()),
        }
    }
}

#[test]
fn ers_allows_sample_size_at_population_size() {
    let config = ExperimentConfig {
        population_size: 10,
        sample_sizes: vec![10, 20],
        sampling: SamplingStrategy::Ers,
        ..Default::default()
    };
    assert!(Experiment::new(config).is_ok());
}

#[test]
fn unknown_strategy_name_is_rejected() {
    let err = "cluster".parse::<SamplingStrategy>().unwrap_err();
    assert!(matches!(err, SimError::UnknownSamplingStrategy(_)));
    assert!("lottery".parse::<SwitchTrigger>().is_err());
}

#[test]
fn comparison_basis_accepts_aliases_and_rejects_unknown_names() {
    for name in ["objective", "payoff", "Objective"] {
        assert_eq!(name.parse::<ComparisonBasis>().unwrap(), ComparisonBasis::Objective);
    }
    for name in ["star", "star_rating", "STAR"] {
        assert_eq!(name.parse::<ComparisonBasis>().unwrap(), ComparisonBasis::StarRating);
    }
    let err = "vibes".parse::<ComparisonBasis>().unwrap_err();
    assert!(matches!(&err, SimError::UnknownComparisonBasis(name) if name == "vibes"), "got {err:?}");
}

#[test]
fn config_file_missing_a_field_is_rejected() {
    let mut json = serde_json::to_value(ExperimentConfig::default()).unwrap();
    json.as_object_mut().unwrap().remove("gamma");

    let path = std::env::temp_dir().join(format!("review-market-missing-{}.json", std::process::id()));
    std::fs::write(&path, json.to_string()).unwrap();
    let result = ExperimentConfig::load(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(SimError::Serialization(_))), "got {result:?}");
}

#[test]
fn unvalidated_file_can_be_fixed_before_validation() {
    // Valid only once sampling switches to ERS: N = 30 exceeds the population.
    let config = ExperimentConfig {
        population_size: 20,
        sample_sizes: vec![30],
        sampling: SamplingStrategy::Srs,
        ..Default::default()
    };
    let path = std::env::temp_dir().join(format!("review-market-fixable-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
    let validated = ExperimentConfig::load(&path);
    let unvalidated = ExperimentConfig::load_unvalidated(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(validated, Err(SimError::Config { .. })), "got {validated:?}");
    let mut config = unvalidated.unwrap();
    assert!(Experiment::new(config.clone()).is_err());
    config.sampling = SamplingStrategy::Ers;
    assert!(Experiment::new(config).is_ok());
}

#[test]
fn config_file_round_trips() {
    let config = ExperimentConfig {
        sampling: SamplingStrategy::Ers,
        switch_trigger: SwitchTrigger::Endogenous,
        ..Default::default()
    };
    let path = std::env::temp_dir().join(format!("review-market-ok-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = ExperimentConfig::load(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.unwrap(), config);
}
