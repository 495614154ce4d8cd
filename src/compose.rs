//! Compose a document into a backend-agnostic render plan.
//!
//! One plan per render pass, ops in a fixed layer order: photo, word,
//! distractors, exclusion outline. Every stage is skipped when its data is
//! absent; the plan only reads the document.

use kurbo::{Affine, BezPath};

use crate::{
    assets::PreparedPhoto,
    error::LhResult,
    layout::{Canvas, PRINT_DPI},
    model::Document,
    render::RenderSettings,
    text::{FontSpec, Label, TextLayoutEngine},
};

/// Stroke width for glyph outlines, in canvas pixels.
pub const GLYPH_STROKE_WIDTH: f64 = 2.0;
/// Stroke width for the exclusion outline.
pub const OUTLINE_STROKE_WIDTH: f64 = 2.0;

pub struct RenderPlan {
    pub canvas: Canvas,
    /// Background the canvas is cleared to before any op runs.
    pub clear_rgb: [u8; 3],
    pub ops: Vec<DrawOp>,
}

pub enum DrawOp {
    /// Source photo under `translate(img_offset) * scale(effective_scale)`.
    Photo {
        photo: PreparedPhoto,
        transform: Affine,
    },
    /// A shaped label, stroked as outline glyphs.
    Label {
        label: Label,
        transform: Affine,
        stroke_width: f64,
    },
    /// The exclusion outline polyline.
    Outline { path: BezPath, stroke_width: f64 },
}

pub fn compose(
    doc: &Document,
    photo: Option<&PreparedPhoto>,
    fonts: &mut TextLayoutEngine,
    settings: &RenderSettings,
) -> LhResult<RenderPlan> {
    doc.validate()?;

    let canvas = doc.layout.canvas;
    let mut ops = Vec::new();

    if let Some(photo) = photo {
        let scale = doc.layout.effective_scale();
        let transform = Affine::translate(kurbo::Vec2::from(doc.layout.img_offset))
            * Affine::scale(scale);
        ops.push(DrawOp::Photo {
            photo: photo.clone(),
            transform,
        });
    }

    if !doc.word.is_empty() {
        let font = FontSpec::parse(&doc.font, &FontSpec::default_word());
        let label = fonts.layout_label(&doc.word, &font, PRINT_DPI)?;
        let ink = label.ink_extent();
        let transform = Affine::translate((
            f64::from(canvas.width) / 2.0 - ink.width / 2.0 + doc.layout.word_offset.x,
            f64::from(canvas.height) / 2.0 - ink.height / 2.0 + doc.layout.word_offset.y,
        ));
        ops.push(DrawOp::Label {
            label,
            transform,
            stroke_width: GLYPH_STROKE_WIDTH,
        });
    }

    if !doc.distractors.is_empty() {
        let font = FontSpec::parse(&doc.distractor_font, &FontSpec::default_distractor());
        for distractor in &doc.distractors {
            if distractor.text.is_empty() {
                continue;
            }
            let label = fonts.layout_label(&distractor.text, &font, PRINT_DPI)?;
            let transform = Affine::translate((distractor.pos.x, distractor.pos.y));
            ops.push(DrawOp::Label {
                label,
                transform,
                stroke_width: GLYPH_STROKE_WIDTH,
            });
        }
    }

    if doc.show_path && !doc.exclusion.is_empty() {
        let mut path = BezPath::new();
        let points = doc.exclusion.points();
        path.move_to(points[0]);
        for &p in &points[1..] {
            path.line_to(p);
        }
        if doc.exclusion.closed {
            path.close_path();
        }
        ops.push(DrawOp::Outline {
            path,
            stroke_width: OUTLINE_STROKE_WIDTH,
        });
    }

    tracing::debug!(ops = ops.len(), "composed render plan");

    Ok(RenderPlan {
        canvas,
        clear_rgb: settings.clear_rgb,
        ops,
    })
}
