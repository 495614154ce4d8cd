//! CPU paint backend over `vello_cpu`.

use crate::{
    assets::PreparedPhoto,
    compose::{DrawOp, RenderPlan},
    error::{LetterhuntError, LhResult},
    render::{FrameRgba, PaintBackend},
};

#[derive(Default)]
pub struct CpuPaint;

impl CpuPaint {
    pub fn new() -> Self {
        Self
    }
}

impl PaintBackend for CpuPaint {
    fn render_plan(&mut self, plan: &RenderPlan) -> LhResult<FrameRgba> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| LetterhuntError::validation("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| LetterhuntError::validation("canvas height exceeds u16"))?;

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        let [r, g, b] = plan.clear_rgb;
        clear_pixmap(&mut pixmap, [r, g, b, 255]);

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        for op in &plan.ops {
            draw_op(&mut ctx, op)?;
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRgba {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(ctx: &mut vello_cpu::RenderContext, op: &DrawOp) -> LhResult<()> {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match op {
        DrawOp::Photo { photo, transform } => {
            let paint = photo_paint(photo)?;
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(photo.width),
                f64::from(photo.height),
            ));
            Ok(())
        }
        DrawOp::Label {
            label,
            transform,
            stroke_width,
        } => {
            ctx.set_transform(affine_to_cpu(*transform));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*stroke_width));

            for line in label.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };

                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));

                    let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    let run_font = run.run().font();
                    let font = vello_cpu::peniko::FontData::new(
                        vello_cpu::peniko::Blob::from(run_font.data.as_ref().to_vec()),
                        run_font.index,
                    );
                    ctx.glyph_run(&font)
                        .font_size(run.run().font_size())
                        .stroke_glyphs(glyphs);
                }
            }
            Ok(())
        }
        DrawOp::Outline { path, stroke_width } => {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*stroke_width));
            ctx.stroke_path(&bezpath_to_cpu(path));
            Ok(())
        }
    }
}

fn photo_paint(photo: &PreparedPhoto) -> LhResult<vello_cpu::Image> {
    let pixmap = premul_bytes_to_pixmap(photo.rgba8_premul.as_slice(), photo.width, photo.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> LhResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LetterhuntError::validation("photo width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LetterhuntError::validation("photo height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(LetterhuntError::validation(
            "prepared photo byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
