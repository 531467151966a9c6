//! Appendix C heatmap + regime map
//!
//! Expected input (long-form CSV): columns `A`, `log10E`, `S`, optionally
//! `dominant` (derived from `S >= 0.5` when absent).

use anyhow::{Context, Result};
use appendix_figures::charts::DEFAULT_DPI;
use appendix_figures::{init_logging, run_heatmap_figures, HeatmapFigureOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "appendix_c_heatmap")]
#[command(about = "Render the Appendix C aligned-share heatmap and regime map", long_about = None)]
struct Cli {
    /// Input long-form CSV
    #[arg(long = "in_csv", default_value = "data/AppendixC_heatmap_dataset.csv")]
    in_csv: PathBuf,

    /// Output PNG for the aligned-share heatmap
    #[arg(long = "out_heatmap", default_value = "figures/AppendixC_heatmap_aligned_share.png")]
    out_heatmap: PathBuf,

    /// Output PNG for the binary regime map
    #[arg(long = "out_regime", default_value = "figures/AppendixC_regime_map_S_ge_0p5.png")]
    out_regime: PathBuf,

    /// Output resolution
    #[arg(long, default_value_t = DEFAULT_DPI)]
    dpi: u32,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let opts = HeatmapFigureOptions {
        in_csv: cli.in_csv,
        out_heatmap: cli.out_heatmap,
        out_regime: cli.out_regime,
        dpi: cli.dpi,
    };

    run_heatmap_figures(&opts, |path| println!("Wrote: {}", path.display()))
        .with_context(|| format!("rendering heatmaps from {}", opts.in_csv.display()))?;

    Ok(())
}
