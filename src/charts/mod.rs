//! Charts module - Static figure rendering

pub mod colormap;
pub mod contour;
pub mod heatmap;
pub mod renderer;
pub mod table;

pub use contour::{iso_line, ContourLine};
pub use heatmap::HeatmapRenderer;
pub use renderer::{FigureCanvas, RenderError, DEFAULT_DPI};
pub use table::TableRenderer;
