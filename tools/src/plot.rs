//! plot-results: compare ERS and SRS result files.
//!
//! Usage:
//!   plot-results --ers result_ers.csv --srs result_srs.csv \
//!                --num-seeds 100 --num-periods 500 --output shares.png

use anyhow::Result;
use clap::Parser;
use plotters::prelude::*;
use review_market_core::{
    analysis::{ResultGrid, SeedAverages, DEFAULT_PLOT_PERIODS},
    config::seeds_from_count,
    store::read_records_from_path,
    types::Period,
};
use std::path::{Path, PathBuf};

const SUBPLOT_ROWS: usize = 3;
const SUBPLOT_COLS: usize = 2;

/// Plot seed-averaged HIGH market share against review sample size.
#[derive(Parser, Debug)]
#[command(name = "plot-results")]
struct Args {
    /// Result file produced with ERS sampling
    #[arg(long)]
    ers: PathBuf,

    /// Result file produced with SRS sampling
    #[arg(long)]
    srs: PathBuf,

    /// Seeds each file must contain (0..num_seeds)
    #[arg(long)]
    num_seeds: u64,

    /// Periods each run must contain
    #[arg(long)]
    num_periods: Period,

    /// Sample sizes each file must contain
    #[arg(long, value_delimiter = ',', default_value = "2,6,10,16,24,50,100,200")]
    sample_sizes: Vec<usize>,

    /// Periods to plot (1-based)
    #[arg(long, value_delimiter = ',')]
    periods: Option<Vec<Period>>,

    /// Output image path (PNG)
    #[arg(long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let seeds = seeds_from_count(args.num_seeds);

    let load = |path: &Path| -> Result<SeedAverages> {
        let records = read_records_from_path(path)?;
        let grid = ResultGrid::from_records(&records, &args.sample_sizes, &seeds, args.num_periods)?;
        Ok(grid.seed_averages())
    };
    let ers = load(args.ers.as_path())?;
    let srs = load(args.srs.as_path())?;

    let periods = args.periods.clone().unwrap_or_else(|| DEFAULT_PLOT_PERIODS.to_vec());
    plot_averages(&ers, &srs, &periods, &args.output)
        .map_err(|e| anyhow::anyhow!("Cannot draw {}: {e}", args.output.display()))?;

    println!("wrote {}", args.output.display());
    Ok(())
}

fn plot_averages(
    ers: &SeedAverages,
    srs: &SeedAverages,
    periods: &[Period],
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(output, (1500, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = ers.sample_sizes.iter().copied().max().unwrap_or(1) as f64 * 1.05;
    let panels = root.split_evenly((SUBPLOT_ROWS, SUBPLOT_COLS));
    let (periods, dropped) = split_panel_periods(periods);
    if !dropped.is_empty() {
        log::warn!("only {} panels: dropping t={dropped:?}", SUBPLOT_ROWS * SUBPLOT_COLS);
    }

    for (panel, &t) in panels.iter().zip(periods) {
        let (Some(ers_shares), Some(srs_shares)) = (ers.at_plot_period(t), srs.at_plot_period(t))
        else {
            log::warn!("skipping t={t}: outside the recorded periods");
            continue;
        };

        let mut chart = ChartBuilder::on(panel)
            .caption(format!("t={t}"), ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..x_max, 0f64..1f64)?;

        chart
            .configure_mesh()
            .x_desc("# reviewers")
            .y_desc("H marketshare")
            .draw()?;

        let xs = ers.sample_sizes.iter().map(|&n| n as f64);
        chart
            .draw_series(LineSeries::new(xs.clone().zip(ers_shares), &BLUE))?
            .label("ERS")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        chart
            .draw_series(LineSeries::new(xs.zip(srs_shares), &RED))?
            .label("SRS")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Periods that get a panel, and the ones past the last panel.
fn split_panel_periods(periods: &[Period]) -> (&[Period], &[Period]) {
    periods.split_at(periods.len().min(SUBPLOT_ROWS * SUBPLOT_COLS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_past_the_last_panel_are_reported() {
        let (shown, dropped) = split_panel_periods(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(shown, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(dropped, &[7, 8]);

        let (shown, dropped) = split_panel_periods(&DEFAULT_PLOT_PERIODS);
        assert_eq!(shown.len(), DEFAULT_PLOT_PERIODS.len());
        assert!(dropped.is_empty());
    }
}
