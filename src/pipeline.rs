//! End-to-end figure pipelines: load CSV, reshape, render, save.

use crate::charts::{iso_line, HeatmapRenderer, RenderError, TableRenderer};
use crate::data::grid::DOMINANCE_THRESHOLD;
use crate::data::{
    DataLoader, GridError, GridPivot, LoaderError, ScenarioLabels, SummaryError, SummaryFormatter,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Inputs of the summary table figure.
#[derive(Debug, Clone)]
pub struct TableFigureOptions {
    pub in_csv: PathBuf,
    pub out_png: PathBuf,
    /// `None` keeps the scenario names from the input.
    pub labels: Option<ScenarioLabels>,
    pub dpi: u32,
}

/// Inputs of the heatmap and regime map figures.
#[derive(Debug, Clone)]
pub struct HeatmapFigureOptions {
    pub in_csv: PathBuf,
    pub out_heatmap: PathBuf,
    pub out_regime: PathBuf,
    pub dpi: u32,
}

/// Build the summary table figure. `on_written` is called once the PNG exists.
pub fn run_table_figure<F>(opts: &TableFigureOptions, mut on_written: F) -> Result<(), PipelineError>
where
    F: FnMut(&Path),
{
    let mut loader = DataLoader::new();
    loader.load_csv(&opts.in_csv)?;
    let df = loader.into_dataframe()?;

    let rows = SummaryFormatter::build_rows(&df, opts.labels.as_ref())?;
    tracing::info!(rows = rows.len(), "formatted scenario summary");

    TableRenderer::render_to_file(&rows, &opts.out_png, opts.dpi)?;
    on_written(&opts.out_png);
    Ok(())
}

/// Build the heatmap and regime map. The schema is checked before anything is
/// drawn, so a missing column leaves no output files behind.
pub fn run_heatmap_figures<F>(
    opts: &HeatmapFigureOptions,
    mut on_written: F,
) -> Result<(), PipelineError>
where
    F: FnMut(&Path),
{
    let mut loader = DataLoader::new();
    loader.load_csv(&opts.in_csv)?;
    let df = loader.into_dataframe()?;

    let grid = GridPivot::prepare(&df)?;
    let (rows, cols) = grid.shape();
    tracing::info!(rows, cols, "pivoted heatmap grid");

    let contour = iso_line(
        &grid.a_values,
        &grid.log10e_values,
        &grid.share,
        DOMINANCE_THRESHOLD,
    );
    match &contour {
        Some(line) => tracing::debug!(
            level = line.level,
            segments = line.segments.len(),
            "dominance boundary traced"
        ),
        None => tracing::warn!("no S = 0.5 boundary in grid, drawing heatmap without contour"),
    }

    HeatmapRenderer::render_share_to_file(&grid, contour.as_ref(), &opts.out_heatmap, opts.dpi)?;
    on_written(&opts.out_heatmap);

    HeatmapRenderer::render_regime_to_file(&grid, &opts.out_regime, opts.dpi)?;
    on_written(&opts.out_regime);

    Ok(())
}
