//! Render pass plumbing: settings, the paint backend seam, and the frame
//! readback with PNG export.

use crate::{
    assets,
    compose::{RenderPlan, compose},
    error::{LetterhuntError, LhResult},
    model::Document,
    text::TextLayoutEngine,
};

/// Final composed pixels, RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRgba {
    /// Encode the frame as a PNG byte buffer.
    pub fn encode_png(&self) -> LhResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| LetterhuntError::validation("frame byte length mismatch"))?;

        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageFormat::Png,
            )
            .map_err(|e| LetterhuntError::validation(format!("encode png: {e}")))?;
        Ok(out)
    }
}

#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Background the sheet is cleared to; printed sheets want white.
    pub clear_rgb: [u8; 3],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_rgb: [255, 255, 255],
        }
    }
}

/// Executes a render plan into pixels. The plan borrows the backend for one
/// pass; the backend flushes and reads back on every path out.
pub trait PaintBackend {
    fn render_plan(&mut self, plan: &RenderPlan) -> LhResult<FrameRgba>;
}

/// Compose and paint a document in one call.
///
/// The source photo is loaded from the document's path; an unreadable photo
/// degrades to the flat background instead of failing the pass.
pub fn render_document(
    doc: &Document,
    settings: &RenderSettings,
    backend: &mut dyn PaintBackend,
) -> LhResult<FrameRgba> {
    let photo = if doc.path.is_empty() {
        None
    } else {
        match assets::load_photo(&doc.path) {
            Ok(photo) => {
                if doc.layout.natural_width() != f64::from(photo.width)
                    || doc.layout.natural_height() != f64::from(photo.height)
                {
                    tracing::warn!(
                        path = %doc.path,
                        "photo natural size differs from the document layout; \
                         adopt it with LayoutParams::with_natural_size before rendering"
                    );
                }
                Some(photo)
            }
            Err(LetterhuntError::ImageLoad(msg)) => {
                tracing::warn!(
                    path = %doc.path,
                    error = %msg,
                    "photo unavailable, rendering flat background"
                );
                None
            }
            Err(other) => return Err(other),
        }
    };

    let mut fonts = TextLayoutEngine::new();
    let plan = compose(doc, photo.as_ref(), &mut fonts, settings)?;
    backend.render_plan(&plan)
}
