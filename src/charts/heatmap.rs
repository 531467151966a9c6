//! Heatmap and Regime Map Figures
//! Raster images of the pivoted grid with a colorbar on the right.
//!
//! Both images use the data extent of each axis, origin bottom-left, and
//! split the extent evenly between grid cells.

use crate::charts::colormap::{BinaryRegime, ColorScale, Viridis};
use crate::charts::contour::ContourLine;
use crate::charts::renderer::{draw_err, FigureCanvas, RenderError, FONT_FAMILY};
use crate::data::GridMatrices;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

pub const FIGURE_WIDTH_IN: f64 = 8.5;
pub const FIGURE_HEIGHT_IN: f64 = 6.0;

pub const X_LABEL: &str = "Alignment probability A";
pub const Y_LABEL: &str = "log10(E)";
pub const SHARE_TITLE: &str = "Appendix C: Aligned share S(A, E)";
pub const SHARE_COLORBAR_LABEL: &str = "Aligned share S = C_a/(C_a + C_m)";
pub const REGIME_TITLE: &str = "Appendix C: Regime map (S ≥ 0.5)";
pub const REGIME_COLORBAR_LABEL: &str = "Dominant regime (1=aligned, 0=misaligned)";

const TITLE_PT: f64 = 12.0;
const AXIS_DESC_PT: f64 = 10.0;
const TICK_PT: f64 = 9.0;
const CONTOUR_WIDTH_PT: f64 = 1.5;
const CONTOUR_COLOR: RGBColor = RGBColor(255, 255, 255);
const MAIN_FRACTION: f64 = 0.82;
const COLORBAR_STEPS: usize = 256;
// Ticks at 0 and 1 only
const BINARY_TICKS: usize = 2;

/// Min/max of an axis; a single value is widened by 0.5 each way.
pub fn axis_extent(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo < hi {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

/// Data-space span of cell `i` when `extent` is split into `n` equal cells.
pub fn cell_bounds(extent: (f64, f64), n: usize, i: usize) -> (f64, f64) {
    let step = (extent.1 - extent.0) / n.max(1) as f64;
    (extent.0 + i as f64 * step, extent.0 + (i + 1) as f64 * step)
}

#[derive(Clone, Copy)]
enum ColorbarTicks {
    Continuous,
    /// Only the two class values are labeled.
    Binary,
}

struct Panel<'a> {
    values: &'a [Vec<f64>],
    scale: &'a dyn ColorScale,
    title: &'a str,
    colorbar_label: &'a str,
    ticks: ColorbarTicks,
    contour: Option<&'a ContourLine>,
}

/// Renders the Appendix C heatmap and regime map.
pub struct HeatmapRenderer;

impl HeatmapRenderer {
    /// Continuous `S` heatmap, with the `S = 0.5` boundary when one exists.
    pub fn render_share(
        grid: &GridMatrices,
        contour: Option<&ContourLine>,
        dpi: u32,
    ) -> Result<FigureCanvas, RenderError> {
        let (lo, hi) = grid.share_range();
        let scale = Viridis::new(lo, hi);
        Self::render_panel(
            grid,
            Panel {
                values: &grid.share,
                scale: &scale,
                title: SHARE_TITLE,
                colorbar_label: SHARE_COLORBAR_LABEL,
                ticks: ColorbarTicks::Continuous,
                contour,
            },
            dpi,
        )
    }

    /// Binary regime map of `dominant`.
    pub fn render_regime(grid: &GridMatrices, dpi: u32) -> Result<FigureCanvas, RenderError> {
        Self::render_panel(
            grid,
            Panel {
                values: &grid.dominant,
                scale: &BinaryRegime,
                title: REGIME_TITLE,
                colorbar_label: REGIME_COLORBAR_LABEL,
                ticks: ColorbarTicks::Binary,
                contour: None,
            },
            dpi,
        )
    }

    pub fn render_share_to_file(
        grid: &GridMatrices,
        contour: Option<&ContourLine>,
        path: &Path,
        dpi: u32,
    ) -> Result<(), RenderError> {
        Self::render_share(grid, contour, dpi)?.export(path)
    }

    pub fn render_regime_to_file(
        grid: &GridMatrices,
        path: &Path,
        dpi: u32,
    ) -> Result<(), RenderError> {
        Self::render_regime(grid, dpi)?.export(path)
    }

    fn render_panel(
        grid: &GridMatrices,
        panel: Panel<'_>,
        dpi: u32,
    ) -> Result<FigureCanvas, RenderError> {
        let mut canvas = FigureCanvas::new(FIGURE_WIDTH_IN, FIGURE_HEIGHT_IN, dpi);
        let (width, _) = canvas.size();
        let title_px = canvas.pt(TITLE_PT);
        let desc_px = canvas.pt(AXIS_DESC_PT);
        let tick_px = canvas.pt(TICK_PT);
        let contour_px = canvas.pt(CONTOUR_WIDTH_PT).round().max(1.0) as u32;
        let margin = canvas.inches(0.15) as i32;
        let x_area = canvas.inches(0.6) as i32;
        let y_area = canvas.inches(0.75) as i32;
        // Keeps the colorbar level with the plot area below the title
        let caption_h = (title_px * 1.6).round() as i32;

        let x_extent = axis_extent(&grid.a_values);
        let y_extent = axis_extent(&grid.log10e_values);
        let (rows, cols) = grid.shape();

        {
            let root = canvas.backend().into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            let (main, bar) = root.split_horizontally((width as f64 * MAIN_FRACTION) as i32);

            let mut chart = ChartBuilder::on(&main)
                .caption(panel.title, (FONT_FAMILY, title_px))
                .margin(margin)
                .x_label_area_size(x_area)
                .y_label_area_size(y_area)
                .build_cartesian_2d(x_extent.0..x_extent.1, y_extent.0..y_extent.1)
                .map_err(draw_err)?;

            let scale = panel.scale;
            chart
                .draw_series(panel.values.iter().enumerate().flat_map(|(r, row)| {
                    row.iter().enumerate().map(move |(c, &v)| {
                        let (x0, x1) = cell_bounds(x_extent, cols, c);
                        let (y0, y1) = cell_bounds(y_extent, rows, r);
                        Rectangle::new([(x0, y0), (x1, y1)], scale.color(v).filled())
                    })
                }))
                .map_err(draw_err)?;

            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc(X_LABEL)
                .y_desc(Y_LABEL)
                .label_style((FONT_FAMILY, tick_px))
                .axis_desc_style((FONT_FAMILY, desc_px))
                .draw()
                .map_err(draw_err)?;

            if let Some(line) = panel.contour {
                let style = CONTOUR_COLOR.stroke_width(contour_px);
                chart
                    .draw_series(
                        line.segments
                            .iter()
                            .map(|seg| PathElement::new(vec![seg[0], seg[1]], style)),
                    )
                    .map_err(draw_err)?;
            }

            Self::draw_colorbar(
                &bar,
                &panel,
                margin + caption_h,
                margin + x_area,
                tick_px,
                desc_px,
            )?;

            root.present().map_err(draw_err)?;
        }

        Ok(canvas)
    }

    fn draw_colorbar<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        panel: &Panel<'_>,
        top: i32,
        bottom: i32,
        tick_px: f64,
        desc_px: f64,
    ) -> Result<(), RenderError> {
        let (lo, hi) = panel.scale.range();
        let hi = if hi > lo { hi } else { lo + 1.0 };
        let (area_w, _) = area.dim_in_pixel();

        let mut bar = ChartBuilder::on(area)
            .margin_top(top)
            .margin_bottom(bottom)
            .margin_left((area_w / 8) as i32)
            .margin_right((area_w / 10) as i32)
            .right_y_label_area_size((area_w / 2) as i32)
            .build_cartesian_2d(0.0..1.0, lo..hi)
            .map_err(draw_err)?;

        let scale = panel.scale;
        match panel.ticks {
            ColorbarTicks::Continuous => {
                let step = (hi - lo) / COLORBAR_STEPS as f64;
                bar.draw_series((0..COLORBAR_STEPS).map(|i| {
                    let y0 = lo + i as f64 * step;
                    let y1 = y0 + step;
                    Rectangle::new(
                        [(0.0, y0), (1.0, y1)],
                        scale.color((y0 + y1) / 2.0).filled(),
                    )
                }))
                .map_err(draw_err)?;
            }
            ColorbarTicks::Binary => {
                let mid = (lo + hi) / 2.0;
                bar.draw_series([(lo, mid), (mid, hi)].into_iter().map(|(y0, y1)| {
                    Rectangle::new([(0.0, y0), (1.0, y1)], scale.color(y0).filled())
                }))
                .map_err(draw_err)?;
            }
        }

        let ticks = panel.ticks;
        let formatter = move |v: &f64| match ticks {
            ColorbarTicks::Continuous => format!("{:.2}", v),
            ColorbarTicks::Binary if (v - v.round()).abs() < 1e-9 => format!("{:.0}", v),
            ColorbarTicks::Binary => String::new(),
        };

        let mut mesh = bar.configure_mesh();
        mesh.disable_mesh()
            .disable_x_axis()
            .y_desc(panel.colorbar_label)
            .y_label_formatter(&formatter)
            .label_style((FONT_FAMILY, tick_px))
            .axis_desc_style((FONT_FAMILY, desc_px));
        if let ColorbarTicks::Binary = panel.ticks {
            mesh.y_labels(BINARY_TICKS);
        }
        mesh.draw().map_err(draw_err)?;

        Ok(())
    }
}
