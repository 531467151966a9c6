//! Appendix Figures - static figures from precomputed CSV datasets
//!
//! Two independent pipelines:
//! - Appendix D: Monte Carlo summary table (`appendix_d_table`)
//! - Appendix C: aligned-share heatmap and regime map (`appendix_c_heatmap`)

pub mod charts;
pub mod data;
pub mod pipeline;

pub use pipeline::{
    run_heatmap_figures, run_table_figure, HeatmapFigureOptions, PipelineError,
    TableFigureOptions,
};

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr.
///
/// Use `RUST_LOG` environment variable to override the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
