//! Summary Table Figure
//! Draws the Monte Carlo summary as a bordered four-column table.
//!
//! Layout:
//! 1. Header row: bold, centered, 1.15x the body row height
//! 2. Body rows: scenario label left-aligned, intervals and probability centered
//! 3. Column widths 0.42 / 0.22 / 0.22 / 0.14 of the table width

use crate::charts::renderer::{bold_face_available, draw_err, FigureCanvas, RenderError, FONT_FAMILY};
use crate::data::{SummaryRow, TABLE_HEADERS};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

pub const FIGURE_WIDTH_IN: f64 = 16.0;
pub const FIGURE_HEIGHT_IN: f64 = 4.8;
pub const FONT_SIZE_PT: f64 = 11.0;
pub const COLUMN_WIDTHS: [f64; 4] = [0.42, 0.22, 0.22, 0.14];

// Table spans the default axes width of the figure
const TABLE_WIDTH_FRACTION: f64 = 0.775;
const LINE_SPACING: f64 = 1.2;
const ROW_SCALE: f64 = 2.1;
const HEADER_SCALE: f64 = 1.15;
const CELL_TEXT_PAD: f64 = 0.02;
const EDGE_WIDTH_PT: f64 = 1.0;
const MARGIN_IN: f64 = 0.3;
// Overstrike offset as a fraction of the font size
const OVERSTRIKE_FRACTION: f64 = 0.05;

/// Pixel geometry of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub column_widths: Vec<u32>,
    pub header_height: u32,
    pub row_heights: Vec<u32>,
    pub font_px: f64,
}

impl TableLayout {
    /// Compute geometry for a table with the given line count per cell row.
    pub fn compute(dpi: u32, header_lines: usize, body_lines: &[usize]) -> Self {
        let font_px = FONT_SIZE_PT * dpi as f64 / 72.0;
        let table_width = FIGURE_WIDTH_IN * TABLE_WIDTH_FRACTION * dpi as f64;

        let column_widths = COLUMN_WIDTHS
            .iter()
            .map(|w| (w * table_width).round() as u32)
            .collect();

        let base = font_px * LINE_SPACING * ROW_SCALE;
        // Multi-line cells grow past the base height instead of overflowing
        let fit = |lines: usize| lines as f64 * font_px * LINE_SPACING + font_px;

        let header_height = (base * HEADER_SCALE).max(fit(header_lines)).round() as u32;
        let row_heights = body_lines
            .iter()
            .map(|&lines| base.max(fit(lines)).round() as u32)
            .collect();

        Self {
            column_widths,
            header_height,
            row_heights,
            font_px,
        }
    }

    pub fn width(&self) -> u32 {
        self.column_widths.iter().sum()
    }

    pub fn height(&self) -> u32 {
        self.header_height + self.row_heights.iter().sum::<u32>()
    }
}

fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}

/// Font for one table row plus the horizontal overstrike (0 for none).
struct RowFont {
    desc: FontDesc<'static>,
    overstrike: i32,
}

impl RowFont {
    fn header(font_px: f64) -> Self {
        let overstrike = if bold_face_available() {
            0
        } else {
            (font_px * OVERSTRIKE_FRACTION).round().max(1.0) as i32
        };
        Self {
            desc: (FONT_FAMILY, font_px).into_font().style(FontStyle::Bold),
            overstrike,
        }
    }

    fn body(font_px: f64) -> Self {
        Self {
            desc: (FONT_FAMILY, font_px).into_font(),
            overstrike: 0,
        }
    }
}

/// Renders the summary table figure.
pub struct TableRenderer;

impl TableRenderer {
    pub fn render(rows: &[SummaryRow], dpi: u32) -> Result<FigureCanvas, RenderError> {
        let header_lines = TABLE_HEADERS.iter().map(|h| line_count(h)).max().unwrap_or(1);
        let body_lines: Vec<usize> = rows
            .iter()
            .map(|r| r.cells().iter().map(|c| line_count(c)).max().unwrap_or(1))
            .collect();
        let layout = TableLayout::compute(dpi, header_lines, &body_lines);

        let min_height_in = layout.height() as f64 / dpi as f64 + 2.0 * MARGIN_IN;
        let mut canvas = FigureCanvas::new(FIGURE_WIDTH_IN, FIGURE_HEIGHT_IN.max(min_height_in), dpi);
        let (width, height) = canvas.size();
        let edge_px = canvas.pt(EDGE_WIDTH_PT).round().max(1.0) as u32;

        tracing::debug!(
            rows = rows.len(),
            width = layout.width(),
            height = layout.height(),
            "table layout"
        );

        {
            let root = canvas.backend().into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let left = (width as i32 - layout.width() as i32) / 2;
            let mut top = (height as i32 - layout.height() as i32) / 2;

            let header_font = RowFont::header(layout.font_px);
            let body_font = RowFont::body(layout.font_px);

            Self::draw_row(
                &root,
                &layout,
                &TABLE_HEADERS,
                left,
                top,
                layout.header_height,
                &header_font,
                false,
                edge_px,
            )?;
            top += layout.header_height as i32;

            for (row, &row_h) in rows.iter().zip(&layout.row_heights) {
                Self::draw_row(
                    &root,
                    &layout,
                    &row.cells(),
                    left,
                    top,
                    row_h,
                    &body_font,
                    true,
                    edge_px,
                )?;
                top += row_h as i32;
            }

            root.present().map_err(draw_err)?;
        }

        Ok(canvas)
    }

    /// Render and write the table figure to `path`.
    pub fn render_to_file(rows: &[SummaryRow], path: &Path, dpi: u32) -> Result<(), RenderError> {
        Self::render(rows, dpi)?.export(path)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        layout: &TableLayout,
        cells: &[&str; 4],
        left: i32,
        top: i32,
        row_h: u32,
        font: &RowFont,
        left_align_first: bool,
        edge_px: u32,
    ) -> Result<(), RenderError> {
        let line_h = layout.font_px * LINE_SPACING;
        let mut x = left;

        for (col, (&text, &col_w)) in cells.iter().zip(&layout.column_widths).enumerate() {
            let x1 = x + col_w as i32;
            let y1 = top + row_h as i32;
            root.draw(&Rectangle::new(
                [(x, top), (x1, y1)],
                BLACK.stroke_width(edge_px),
            ))
            .map_err(draw_err)?;

            let (text_x, h_pos) = if left_align_first && col == 0 {
                (x + (col_w as f64 * CELL_TEXT_PAD).round() as i32, HPos::Left)
            } else {
                (x + col_w as i32 / 2, HPos::Center)
            };
            let style = font.desc.color(&BLACK).pos(Pos::new(h_pos, VPos::Center));

            let lines: Vec<&str> = text.lines().collect();
            let center_y = top as f64 + row_h as f64 / 2.0;
            let first_y = center_y - (lines.len().saturating_sub(1)) as f64 * line_h / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let y = (first_y + i as f64 * line_h).round() as i32;
                root.draw(&Text::new(line.to_string(), (text_x, y), style.clone()))
                    .map_err(draw_err)?;
                if font.overstrike > 0 {
                    root.draw(&Text::new(
                        line.to_string(),
                        (text_x + font.overstrike, y),
                        style.clone(),
                    ))
                    .map_err(draw_err)?;
                }
            }

            x = x1;
        }

        Ok(())
    }
}
