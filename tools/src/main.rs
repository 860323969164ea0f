//! sim-runner: headless experiment runner.
//!
//! Usage:
//!   sim-runner --sampling SRS --num-seeds 100 --num-periods 500 --output result_srs.csv
//!   sim-runner --config experiment.json --parallel

use anyhow::Result;
use clap::Parser;
use review_market_core::{
    config::{seeds_from_count, ComparisonBasis, ExperimentConfig, SamplingStrategy, SwitchTrigger},
    experiment::{Experiment, SweepSummary},
    store::ResultWriter,
};
use std::path::PathBuf;

/// Run a review-sampling market experiment and write market-share rows.
#[derive(Parser, Debug)]
#[command(name = "sim-runner")]
#[command(version)]
struct Args {
    /// JSON experiment configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Periods per run
    #[arg(long)]
    num_periods: Option<u64>,

    /// Run seeds 0..num_seeds
    #[arg(long)]
    num_seeds: Option<u64>,

    #[arg(long)]
    population_size: Option<usize>,

    #[arg(long)]
    high_payoff: Option<f64>,

    #[arg(long)]
    low_payoff: Option<f64>,

    /// Standard deviation of the idiosyncratic payoff shock
    #[arg(long)]
    shock_std_dev: Option<f64>,

    /// Review sample sizes to sweep, e.g. 2,6,10
    #[arg(long, value_delimiter = ',')]
    sample_sizes: Option<Vec<usize>>,

    /// Fraction of the population drawn as potential switchers
    #[arg(long)]
    alpha: Option<f64>,

    /// Weight on the newest payoff in the expected-payoff average
    #[arg(long)]
    gamma: Option<f64>,

    /// Ascending star-rating ratio thresholds, e.g. 0.8,0.95,1.05,1.2,1.35
    #[arg(long, value_delimiter = ',')]
    star_thresholds: Option<Vec<f64>>,

    /// SRS or ERS
    #[arg(long)]
    sampling: Option<SamplingStrategy>,

    /// random or endogenous
    #[arg(long)]
    switch_trigger: Option<SwitchTrigger>,

    /// objective or star
    #[arg(long)]
    comparison: Option<ComparisonBasis>,

    /// Result file (CSV rows, no header)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run sweep units across all cores
    #[arg(long)]
    parallel: bool,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Validation happens here, after flag overrides and before the output
    // file is touched.
    let experiment = Experiment::new(resolve_config(&args)?)?;
    let config = experiment.config();

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("review-market — sim-runner");
    println!("  sampling:     {}", config.sampling);
    println!("  trigger:      {:?}", config.switch_trigger);
    println!("  comparison:   {:?}", config.comparison);
    println!("  periods:      {}", config.num_periods);
    println!("  seeds:        {}", config.seeds.len());
    println!("  population:   {}", config.population_size);
    println!("  sample sizes: {:?}", config.sample_sizes);
    println!("  output:       {}", config.output.display());
    println!();

    let mut writer = ResultWriter::create(&config.output)?;
    let summary = if args.parallel {
        experiment.run_parallel(&mut writer)?
    } else {
        experiment.run(&mut writer)?
    };

    print_summary(&summary, writer.written(), config);
    Ok(())
}

/// The file configuration (or the defaults) with every flag applied on top.
fn resolve_config(args: &Args) -> Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load_unvalidated(path)?,
        None => ExperimentConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut ExperimentConfig, args: &Args) {
    if let Some(v) = args.num_periods { config.num_periods = v; }
    if let Some(v) = args.num_seeds { config.seeds = seeds_from_count(v); }
    if let Some(v) = args.population_size { config.population_size = v; }
    if let Some(v) = args.high_payoff { config.high_payoff = v; }
    if let Some(v) = args.low_payoff { config.low_payoff = v; }
    if let Some(v) = args.shock_std_dev { config.shock_std_dev = v; }
    if let Some(v) = &args.sample_sizes { config.sample_sizes = v.clone(); }
    if let Some(v) = args.alpha { config.alpha = v; }
    if let Some(v) = args.gamma { config.gamma = v; }
    if let Some(v) = &args.star_thresholds { config.star_thresholds = v.clone(); }
    if let Some(v) = args.sampling { config.sampling = v; }
    if let Some(v) = args.switch_trigger { config.switch_trigger = v; }
    if let Some(v) = args.comparison { config.comparison = v; }
    if let Some(v) = &args.output { config.output = v.clone(); }
}

fn print_summary(summary: &SweepSummary, written: usize, config: &ExperimentConfig) {
    println!("=== RUN SUMMARY ===");
    println!("  units run:       {}", summary.units);
    println!("  records emitted: {}", summary.records);
    println!("  records written: {written}");
    println!("  expected:        {}", config.expected_record_count());
    println!();
    println!("=== FINAL HIGH SHARE (mean over seeds) ===");
    for (n, share) in &summary.final_share_by_sample_size {
        println!("  N={n:<4} | share: {share:.3}");
    }
}
