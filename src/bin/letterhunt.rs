use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use letterhunt::{
    CpuPaint, Document, PaintBackend as _, PlacementRng, RenderSettings, TextLayoutEngine,
    compose, load_document, load_photo, place_distractor, save_document,
};

#[derive(Parser, Debug)]
#[command(name = "letterhunt", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved document as a PNG sheet.
    Render(RenderArgs),
    /// Place distractor strings into a document and save it back.
    Place(PlaceArgs),
    /// Print a summary of a saved document.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input document JSON.
    #[arg(long = "doc", default_value = letterhunt::DEFAULT_DOCUMENT_NAME)]
    doc_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Document JSON to update in place.
    #[arg(long = "doc", default_value = letterhunt::DEFAULT_DOCUMENT_NAME)]
    doc_path: PathBuf,

    /// Distractor string to place (repeatable).
    #[arg(long = "text", required = true)]
    texts: Vec<String>,

    /// Placement seed; the same seed replays the same anchors.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input document JSON.
    #[arg(long = "doc", default_value = letterhunt::DEFAULT_DOCUMENT_NAME)]
    doc_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Place(args) => cmd_place(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn load_doc_with_photo(
    doc_path: &Path,
) -> anyhow::Result<(Document, Option<letterhunt::PreparedPhoto>)> {
    let mut doc = load_document(doc_path)?;

    let photo = if doc.path.is_empty() {
        None
    } else {
        match load_photo(&doc.path) {
            Ok(photo) => Some(photo),
            Err(e) => {
                eprintln!("warning: {e}; rendering a flat background");
                None
            }
        }
    };

    if let Some(photo) = &photo {
        let (w, h) = (f64::from(photo.width), f64::from(photo.height));
        if doc.layout.natural_width() != w || doc.layout.natural_height() != h {
            doc.layout = doc.layout.with_natural_size(w, h);
        }
    }

    Ok((doc, photo))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (doc, photo) = load_doc_with_photo(&args.doc_path)?;

    let mut fonts = TextLayoutEngine::new();
    let plan = compose(&doc, photo.as_ref(), &mut fonts, &RenderSettings::default())?;
    let frame = CpuPaint::new().render_plan(&plan)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let mut doc = load_document(&args.doc_path)?;

    let seed = args.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let mut rng = PlacementRng::seeded(seed);

    let mut degraded = 0usize;
    for text in &args.texts {
        let placed = place_distractor(text.clone(), doc.layout.canvas, &doc.exclusion, &mut rng);
        if placed.degraded {
            degraded += 1;
        }
        doc.add_distractor(placed.distractor);
    }

    save_document(&doc, &args.doc_path)?;

    eprintln!(
        "placed {} distractor(s) into {}",
        args.texts.len(),
        args.doc_path.display()
    );
    if degraded > 0 {
        eprintln!("warning: {degraded} placement(s) could not avoid the exclusion region");
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let doc = load_document(&args.doc_path)?;
    let canvas = doc.layout.canvas;

    eprintln!("document {}", args.doc_path.display());
    eprintln!("  photo:           {}", or_dash(&doc.path));
    eprintln!("  word:            {}", or_dash(&doc.word));
    eprintln!("  word font:       {}", or_dash(&doc.font));
    eprintln!("  distractor font: {}", or_dash(&doc.distractor_font));
    eprintln!("  canvas:          {}x{}", canvas.width, canvas.height);
    eprintln!("  distractors:     {}", doc.distractors.len());
    eprintln!(
        "  exclusion:       {} point(s), shown: {}, closed: {}",
        doc.exclusion.len(),
        doc.show_path,
        doc.exclusion.closed
    );

    match doc.exclusion.enclosed_area() {
        Ok(area) => {
            let coverage = area / (f64::from(canvas.width) * f64::from(canvas.height)) * 100.0;
            eprintln!("  exclusion area:  {area:.0} px^2 ({coverage:.1}% of canvas)");
        }
        Err(_) if doc.exclusion.is_empty() => {}
        Err(_) => eprintln!("  exclusion area:  none (fewer than 3 points)"),
    }

    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
