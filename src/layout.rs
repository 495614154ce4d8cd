//! Canvas geometry and the scale/translate parameters of the photo layer.
//!
//! Derived quantities (effective scale, scaled dimensions) are never mutated
//! directly: every `with_*` change goes through one recompute step, so a
//! parameter set can never be observed with stale derived fields.

use crate::space::Vec2;

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;
pub const MM_PER_INCH: f64 = 25.4;

/// Print resolution the sheet is composed at.
pub const PRINT_DPI: u32 = 300;

/// Default user scale factor applied on top of the fit estimate.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.5;

/// Pixel count for a physical size at the given resolution (truncating).
pub fn page_pixels(size_mm: f64, dpi: u32) -> u32 {
    (size_mm / MM_PER_INCH * f64::from(dpi)) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// A4 portrait canvas at the given resolution.
    pub fn a4(dpi: u32) -> Self {
        Self {
            width: page_pixels(A4_WIDTH_MM, dpi),
            height: page_pixels(A4_HEIGHT_MM, dpi),
        }
    }

    /// Height over width.
    pub fn ratio(self) -> f64 {
        f64::from(self.height) / f64::from(self.width)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::a4(PRINT_DPI)
    }
}

/// Scale that fits a source of the given natural size inside the canvas
/// while preserving aspect ratio: height-fit when the source is relatively
/// taller than the canvas, width-fit otherwise.
pub fn fit_scale(natural_width: f64, natural_height: f64, canvas: Canvas) -> f64 {
    let source_ratio = natural_height / natural_width;
    if canvas.ratio() < source_ratio {
        f64::from(canvas.height) / natural_height
    } else {
        f64::from(canvas.width) / natural_width
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub canvas: Canvas,
    natural_width: f64,
    natural_height: f64,
    scale_factor: f64,
    scale_estimate: f64,
    effective_scale: f64,
    scaled_width: f64,
    scaled_height: f64,
    /// Photo translation on the canvas, user-adjustable after the estimate.
    pub img_offset: Vec2,
    /// Word translation relative to the canvas center.
    pub word_offset: Vec2,
}

impl LayoutParams {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            natural_width: 0.0,
            natural_height: 0.0,
            scale_factor: DEFAULT_SCALE_FACTOR,
            scale_estimate: 1.0,
            effective_scale: DEFAULT_SCALE_FACTOR,
            scaled_width: 0.0,
            scaled_height: 0.0,
            img_offset: Vec2::ZERO,
            word_offset: Vec2::ZERO,
        }
    }

    pub fn a4() -> Self {
        Self::new(Canvas::default())
    }

    pub fn has_source(&self) -> bool {
        self.natural_width > 0.0 && self.natural_height > 0.0
    }

    pub fn natural_width(&self) -> f64 {
        self.natural_width
    }

    pub fn natural_height(&self) -> f64 {
        self.natural_height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn scale_estimate(&self) -> f64 {
        self.scale_estimate
    }

    pub fn effective_scale(&self) -> f64 {
        self.effective_scale
    }

    pub fn scaled_width(&self) -> f64 {
        self.scaled_width
    }

    pub fn scaled_height(&self) -> f64 {
        self.scaled_height
    }

    /// Record the source image's natural size and re-run the fit estimate,
    /// leaving the offsets alone. Used when re-opening a saved document
    /// whose offsets the user had already adjusted.
    pub fn with_natural_size(mut self, natural_width: f64, natural_height: f64) -> Self {
        self.natural_width = natural_width;
        self.natural_height = natural_height;
        self.scale_estimate = if self.has_source() {
            fit_scale(natural_width, natural_height, self.canvas)
        } else {
            1.0
        };
        self.recompute()
    }

    /// Center the scaled photo on the canvas.
    pub fn recentered(mut self) -> Self {
        self.img_offset = Vec2::new(
            (f64::from(self.canvas.width) - self.scaled_width) / 2.0,
            (f64::from(self.canvas.height) - self.scaled_height) / 2.0,
        );
        self
    }

    /// Adopt a newly loaded source image: re-estimate the fit scale and
    /// recenter the photo. This is the only operation that moves
    /// `img_offset` on its own.
    pub fn with_source_size(self, natural_width: f64, natural_height: f64) -> Self {
        self.with_natural_size(natural_width, natural_height)
            .recentered()
    }

    /// Change the user scale factor. Offsets are left alone; the user may
    /// have customized them.
    pub fn with_scale_factor(mut self, factor: f64) -> Self {
        self.scale_factor = factor;
        self.recompute()
    }

    pub fn with_img_offset(mut self, offset: Vec2) -> Self {
        self.img_offset = offset;
        self
    }

    pub fn with_word_offset(mut self, offset: Vec2) -> Self {
        self.word_offset = offset;
        self
    }

    fn recompute(mut self) -> Self {
        self.effective_scale = self.scale_estimate * self.scale_factor;
        self.scaled_width = self.natural_width * self.effective_scale;
        self.scaled_height = self.natural_height * self.effective_scale;
        self
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::a4()
    }
}
