//! Appendix D summary table
//!
//! ```bash
//! appendix_d_table                                  # default paths
//! appendix_d_table --in_csv summary.csv --out_png table.png
//! appendix_d_table --labels labels.json             # custom scenario labels
//! ```

use anyhow::{Context, Result};
use appendix_figures::charts::DEFAULT_DPI;
use appendix_figures::data::ScenarioLabels;
use appendix_figures::{init_logging, run_table_figure, TableFigureOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "appendix_d_table")]
#[command(about = "Render the Appendix D Monte Carlo summary table", long_about = None)]
struct Cli {
    /// Input CSV with percentile columns and P(C_m > C_a)
    #[arg(long = "in_csv", default_value = "figures/AppendixD_monte_carlo_summary_tightened.csv")]
    in_csv: PathBuf,

    /// Output PNG
    #[arg(long = "out_png", default_value = "figures/AppendixD_monte_carlo_summary_table.png")]
    out_png: PathBuf,

    /// Scenario labels as JSON: an array (by position) or an object (by scenario name)
    #[arg(long, conflicts_with = "keep_labels")]
    labels: Option<PathBuf>,

    /// Keep the scenario names from the input
    #[arg(long)]
    keep_labels: bool,

    /// Output resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let labels = match (&cli.labels, cli.keep_labels) {
        (_, true) => None,
        (Some(path), false) => Some(ScenarioLabels::from_json_file(path)?),
        (None, false) => Some(ScenarioLabels::default()),
    };

    let opts = TableFigureOptions {
        in_csv: cli.in_csv,
        out_png: cli.out_png,
        labels,
        dpi: cli.dpi,
    };

    run_table_figure(&opts, |path| println!("Wrote: {}", path.display()))
        .with_context(|| format!("rendering table from {}", opts.in_csv.display()))?;

    Ok(())
}
