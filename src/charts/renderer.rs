//! Static Figure Renderer
//! Shared canvas for the appendix figures: plotters draws into an in-memory RGB
//! buffer sized from inches and DPI, then the image is cropped to its content
//! and written as PNG.

use image::{ImageFormat, Rgb, RgbImage};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Output resolution used by both figures.
pub const DEFAULT_DPI: u32 = 300;

/// Margin kept around the content after cropping.
pub const CROP_PAD_INCHES: f64 = 0.1;

pub const FONT_FAMILY: &str = "sans-serif";

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

const BOLD_SAMPLE: &str = "Scenario P(C_m > C_a)";
const BOLD_SAMPLE_PX: f64 = 24.0;

static BOLD_FACE: OnceLock<bool> = OnceLock::new();

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Canvas buffer does not match {width}x{height}")]
    Buffer { width: u32, height: u32 },
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Convert any plotters error into a [`RenderError`].
pub fn draw_err<E: std::error::Error>(err: E) -> RenderError {
    RenderError::Draw(err.to_string())
}

/// In-memory RGB raster with a physical size in inches.
pub struct FigureCanvas {
    width: u32,
    height: u32,
    dpi: u32,
    buffer: Vec<u8>,
}

impl FigureCanvas {
    pub fn new(width_in: f64, height_in: f64, dpi: u32) -> Self {
        let width = ((width_in * dpi as f64).round() as u32).max(1);
        let height = ((height_in * dpi as f64).round() as u32).max(1);
        Self {
            width,
            height,
            dpi,
            buffer: vec![255; width as usize * height as usize * 3],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Typographic points to pixels at this canvas' DPI.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    /// Inches to whole pixels.
    pub fn inches(&self, inches: f64) -> u32 {
        (inches * self.dpi as f64).round() as u32
    }

    pub fn backend(&mut self) -> BitMapBackend<'_> {
        BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height))
    }

    pub fn into_image(self) -> Result<RgbImage, RenderError> {
        let (width, height) = (self.width, self.height);
        RgbImage::from_raw(width, height, self.buffer).ok_or(RenderError::Buffer { width, height })
    }

    /// Crop to content and write PNG to `path`.
    pub fn export(self, path: &Path) -> Result<(), RenderError> {
        let pad = self.inches(CROP_PAD_INCHES);
        let img = self.into_image()?;
        let cropped = tight_crop(&img, pad);
        save_png(&cropped, path)
    }
}

/// Whether the font backend resolves a bold [`FONT_FAMILY`] face that differs
/// from the regular one. Without it plotters silently draws bold text regular.
pub fn bold_face_available() -> bool {
    *BOLD_FACE.get_or_init(|| {
        let distinct = match (
            sample_text(FontStyle::Normal),
            sample_text(FontStyle::Bold),
        ) {
            (Ok(regular), Ok(bold)) => regular != bold,
            _ => false,
        };
        if !distinct {
            tracing::warn!(
                family = FONT_FAMILY,
                "no bold face installed, emboldening by overstrike"
            );
        }
        distinct
    })
}

fn sample_text(style: FontStyle) -> Result<Vec<u8>, RenderError> {
    let mut canvas = FigureCanvas::new(6.0, 1.0, 72);
    {
        let root = canvas.backend().into_drawing_area();
        let font = (FONT_FAMILY, BOLD_SAMPLE_PX)
            .into_font()
            .style(style)
            .color(&BLACK);
        root.draw(&Text::new(BOLD_SAMPLE, (4, 4), font))
            .map_err(draw_err)?;
        root.present().map_err(draw_err)?;
    }
    Ok(canvas.buffer)
}

/// Bounding box `(x, y, w, h)` of pixels that differ from the background.
pub fn content_bounds(img: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, px) in img.enumerate_pixels() {
        if *px != BACKGROUND {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Trim background around the drawn content, keeping `pad` pixels on each side.
pub fn tight_crop(img: &RgbImage, pad: u32) -> RgbImage {
    let Some((x, y, w, h)) = content_bounds(img) else {
        return img.clone();
    };

    let x0 = x.saturating_sub(pad);
    let y0 = y.saturating_sub(pad);
    let x1 = (x + w + pad).min(img.width());
    let y1 = (y + h + pad).min(img.height());

    image::imageops::crop_imm(img, x0, y0, x1 - x0, y1 - y0).to_image()
}

/// Write `img` as PNG, creating parent directories as needed.
pub fn save_png(img: &RgbImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }

    img.save_with_format(path, ImageFormat::Png)
        .map_err(|source| RenderError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "saved figure"
    );
    Ok(())
}
