use letterhunt::{
    Canvas, CpuPaint, Distractor, Document, ExclusionBoundary, LayoutParams, PaintBackend as _,
    Point2, RenderSettings, render_document,
};

fn small_canvas_document() -> Document {
    let mut doc = Document::new();
    doc.layout = LayoutParams::new(Canvas {
        width: 64,
        height: 64,
    });
    doc
}

fn write_solid_png(path: &std::path::Path, width: u32, height: u32, rgba: [u8; 4]) {
    let mut img = image::RgbaImage::new(width, height);
    for px in img.pixels_mut() {
        *px = image::Rgba(rgba);
    }
    img.save(path).unwrap();
}

fn pixel(frame: &letterhunt::FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    frame.data[i..i + 4].try_into().unwrap()
}

#[test]
fn empty_document_renders_flat_background() {
    let doc = small_canvas_document();
    let frame = render_document(&doc, &RenderSettings::default(), &mut CpuPaint::new()).unwrap();

    assert_eq!(frame.width, 64);
    assert_eq!(frame.height, 64);
    assert!(frame.premultiplied);
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn photo_layer_lands_centered_and_scaled() {
    let dir = tempfile::tempdir().unwrap();
    let photo_path = dir.path().join("photo.png");
    write_solid_png(&photo_path, 32, 32, [0, 0, 255, 255]);

    let mut doc = small_canvas_document();
    doc.set_source_path(photo_path.to_string_lossy().into_owned());
    // Estimate fits 32x32 into 64x64 (scale 2), halved by the default
    // factor: the photo covers the centered 32x32 square.
    doc.layout = doc.layout.with_source_size(32.0, 32.0);

    let frame = render_document(&doc, &RenderSettings::default(), &mut CpuPaint::new()).unwrap();

    assert_eq!(pixel(&frame, 32, 32), [0, 0, 255, 255]);
    assert_eq!(pixel(&frame, 8, 8), [255, 255, 255, 255]);
    assert_eq!(pixel(&frame, 56, 56), [255, 255, 255, 255]);
}

#[test]
fn missing_photo_degrades_to_flat_background() {
    let mut doc = small_canvas_document();
    doc.set_source_path("no/such/photo.png");

    let frame = render_document(&doc, &RenderSettings::default(), &mut CpuPaint::new()).unwrap();
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn full_document_renders_and_exports_png() {
    let dir = tempfile::tempdir().unwrap();
    let photo_path = dir.path().join("photo.png");
    write_solid_png(&photo_path, 16, 8, [255, 0, 0, 255]);

    let mut doc = small_canvas_document();
    doc.set_source_path(photo_path.to_string_lossy().into_owned());
    doc.layout = doc.layout.with_source_size(16.0, 8.0);
    doc.word = "cat".to_string();
    doc.add_distractor(Distractor::new("c", Point2::new(4.0, 4.0)));
    doc.show_path = true;
    doc.exclusion = ExclusionBoundary::from_points(
        vec![
            Point2::new(2.0, 2.0),
            Point2::new(20.0, 2.0),
            Point2::new(20.0, 20.0),
        ],
        true,
    );

    let frame = render_document(&doc, &RenderSettings::default(), &mut CpuPaint::new()).unwrap();
    assert_eq!(frame.width, 64);

    let png = frame.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.width(), 64);
    assert_eq!(decoded.height(), 64);
}

#[test]
fn render_pass_does_not_mutate_the_document() {
    let mut doc = small_canvas_document();
    doc.word = "dog".to_string();
    doc.add_distractor(Distractor::new("d", Point2::new(10.0, 10.0)));
    let before = doc.clone();

    render_document(&doc, &RenderSettings::default(), &mut CpuPaint::new()).unwrap();
    assert_eq!(doc, before);
}

#[test]
fn render_passes_are_idempotent() {
    let mut doc = small_canvas_document();
    doc.word = "owl".to_string();

    let mut backend = CpuPaint::new();
    let a = render_document(&doc, &RenderSettings::default(), &mut backend).unwrap();
    let b = render_document(&doc, &RenderSettings::default(), &mut backend).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn plan_execution_is_reusable_across_backends() {
    let mut doc = small_canvas_document();
    doc.word = "emu".to_string();

    let mut fonts = letterhunt::TextLayoutEngine::new();
    let plan = letterhunt::compose(&doc, None, &mut fonts, &RenderSettings::default()).unwrap();

    let a = CpuPaint::new().render_plan(&plan).unwrap();
    let b = CpuPaint::new().render_plan(&plan).unwrap();
    assert_eq!(a.data, b.data);
}
