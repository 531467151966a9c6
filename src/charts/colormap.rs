//! Colormaps for raster figures.

use plotters::style::colors::colormaps::ViridisRGB;
use plotters::style::RGBColor;

const MISSING: RGBColor = RGBColor(200, 200, 200);

/// Maps a data value to a fill color.
pub trait ColorScale {
    fn color(&self, value: f64) -> RGBColor;

    /// Value range covered by the scale, used for the colorbar.
    fn range(&self) -> (f64, f64);
}

/// Linear viridis scale over `[min, max]`; values outside are clamped.
#[derive(Debug, Clone, Copy)]
pub struct Viridis {
    min: f64,
    max: f64,
}

impl Viridis {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Color at a normalized position `t` in [0, 1].
    pub fn at(t: f64) -> RGBColor {
        ViridisRGB::get_color(t.clamp(0.0, 1.0))
    }
}

impl ColorScale for Viridis {
    fn color(&self, value: f64) -> RGBColor {
        if !value.is_finite() {
            return MISSING;
        }
        // plotters normalizes by (max - min), so a flat range maps to the low end here
        if self.max > self.min {
            ViridisRGB::get_color_normalized(value, self.min, self.max)
        } else {
            Self::at(0.0)
        }
    }

    fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Two-class scale for the regime map: 0 is misaligned, 1 is aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryRegime;

impl BinaryRegime {
    /// Low end of viridis.
    pub fn misaligned() -> RGBColor {
        Viridis::at(0.0)
    }

    /// High end of viridis.
    pub fn aligned() -> RGBColor {
        Viridis::at(1.0)
    }
}

impl ColorScale for BinaryRegime {
    fn color(&self, value: f64) -> RGBColor {
        if !value.is_finite() {
            MISSING
        } else if value >= 0.5 {
            Self::aligned()
        } else {
            Self::misaligned()
        }
    }

    fn range(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}
