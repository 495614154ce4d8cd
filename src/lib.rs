#![forbid(unsafe_code)]

pub mod assets;
pub mod boundary;
pub mod compose;
pub mod error;
pub mod layout;
pub mod model;
pub mod persist;
pub mod placement;
pub mod render;
pub mod render_cpu;
pub mod space;
pub mod text;

pub use assets::{PreparedPhoto, decode_photo, load_photo};
pub use boundary::ExclusionBoundary;
pub use compose::{DrawOp, RenderPlan, compose};
pub use error::{LetterhuntError, LhResult};
pub use layout::{Canvas, LayoutParams, PRINT_DPI, fit_scale, page_pixels};
pub use model::{Distractor, Document};
pub use persist::{
    Codec, CodecBuilder, DEFAULT_DOCUMENT_NAME, document_codec, document_from_value,
    document_to_value, load_document, save_document,
};
pub use placement::{MAX_PLACEMENT_ATTEMPTS, Placement, PlacementRng, place_distractor};
pub use render::{FrameRgba, PaintBackend, RenderSettings, render_document};
pub use render_cpu::CpuPaint;
pub use space::{Point2, Vec2};
pub use text::{FontSpec, InkExtent, Label, TextLayoutEngine};
