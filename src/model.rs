//! The puzzle document: everything a sheet needs to be re-rendered.

use std::path::Path;

use crate::{
    boundary::ExclusionBoundary,
    error::{LetterhuntError, LhResult},
    layout::LayoutParams,
    space::Point2,
};

/// A scattered decoy string. The anchor is fixed once the distractor is
/// placed; there is no drag-to-move.
#[derive(Clone, Debug, PartialEq)]
pub struct Distractor {
    pub text: String,
    pub pos: Point2,
}

impl Distractor {
    pub fn new(text: impl Into<String>, pos: Point2) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Source photo path. Empty means no photo; an unreadable path degrades
    /// to a flat background at render time.
    pub path: String,
    /// Display name, kept in sync with the basename of `path`.
    pub name: String,
    /// The target word of the puzzle.
    pub word: String,
    /// Word font descriptor, e.g. "Noto Sans Bold 60". Empty selects the
    /// built-in default.
    pub font: String,
    /// Distractor font descriptor. Empty selects the built-in default.
    pub distractor_font: String,
    pub layout: LayoutParams,
    pub distractors: Vec<Distractor>,
    pub exclusion: ExclusionBoundary,
    /// Draw the exclusion outline on the sheet.
    pub show_path: bool,
}

impl Document {
    pub fn new() -> Self {
        Self {
            path: String::new(),
            name: String::new(),
            word: String::new(),
            font: String::new(),
            distractor_font: String::new(),
            layout: LayoutParams::a4(),
            distractors: Vec::new(),
            exclusion: ExclusionBoundary::new(),
            show_path: false,
        }
    }

    /// Point the document at a source photo; the display name follows the
    /// basename. An empty path clears both.
    pub fn set_source_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.name = Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path = path;
    }

    pub fn add_distractor(&mut self, distractor: Distractor) {
        self.distractors.push(distractor);
    }

    pub fn validate(&self) -> LhResult<()> {
        if self.layout.canvas.width == 0 || self.layout.canvas.height == 0 {
            return Err(LetterhuntError::validation(
                "canvas width/height must be > 0",
            ));
        }
        if !(self.layout.scale_factor().is_finite() && self.layout.scale_factor() > 0.0) {
            return Err(LetterhuntError::validation(
                "scale factor must be finite and > 0",
            ));
        }
        for v in [
            self.layout.img_offset.x,
            self.layout.img_offset.y,
            self.layout.word_offset.x,
            self.layout.word_offset.y,
        ] {
            if !v.is_finite() {
                return Err(LetterhuntError::validation("offsets must be finite"));
            }
        }
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
