//! Text layout collaborator: Pango-style font descriptors, Parley shaping,
//! and ink extents for centering.

use std::borrow::Cow;

use crate::error::{LetterhuntError, LhResult};

/// RGBA8 brush color carried through Parley glyph runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl GlyphBrush {
    pub const BLACK: GlyphBrush = GlyphBrush {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// A parsed font request: family plus style plus point size.
///
/// Descriptors follow the loose "Family Style Size" convention of the
/// document format, e.g. "Noto Sans Bold 60". Anything the parser cannot
/// make sense of falls back to the provided default, so a render never
/// fails on a bad descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    pub size_pt: f32,
}

/// Built-in word font: generic sans, bold, 60 pt.
pub const DEFAULT_WORD_SIZE_PT: f32 = 60.0;
/// Built-in distractor font: generic sans, bold, 30 pt.
pub const DEFAULT_DISTRACTOR_SIZE_PT: f32 = 30.0;

impl FontSpec {
    pub fn default_word() -> Self {
        Self {
            family: "sans-serif".to_string(),
            bold: true,
            italic: false,
            size_pt: DEFAULT_WORD_SIZE_PT,
        }
    }

    pub fn default_distractor() -> Self {
        Self {
            family: "sans-serif".to_string(),
            bold: true,
            italic: false,
            size_pt: DEFAULT_DISTRACTOR_SIZE_PT,
        }
    }

    /// Parse a descriptor, taking anything missing from `fallback`.
    pub fn parse(descriptor: &str, fallback: &FontSpec) -> FontSpec {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return fallback.clone();
        }

        let mut tokens: Vec<&str> = descriptor.split_whitespace().collect();

        let size_pt = match tokens.last().and_then(|t| t.parse::<f32>().ok()) {
            Some(size) if size.is_finite() && size > 0.0 => {
                tokens.pop();
                size
            }
            _ => fallback.size_pt,
        };

        let mut bold = false;
        let mut italic = false;
        let mut family_tokens = Vec::new();
        for token in tokens {
            match token.to_ascii_lowercase().as_str() {
                "bold" => bold = true,
                "italic" | "oblique" => italic = true,
                "regular" | "normal" => {}
                _ => family_tokens.push(token),
            }
        }

        let family = match family_tokens.join(" ") {
            f if f.is_empty() => fallback.family.clone(),
            f if f.eq_ignore_ascii_case("sans") => "sans-serif".to_string(),
            f => f,
        };

        FontSpec {
            family,
            bold,
            italic,
            size_pt,
        }
    }

    /// CSS-style family list with a generic fallback appended.
    fn family_stack(&self) -> String {
        if self.family == "sans-serif" {
            self.family.clone()
        } else {
            format!("{}, sans-serif", self.family)
        }
    }

    /// Pixel size at the composition resolution, matching the original's
    /// Pango resolution handling (points at `dpi` rather than 96).
    pub fn size_px(&self, dpi: u32) -> f32 {
        self.size_pt * dpi as f32 / 72.0
    }
}

/// Ink-extent box of a laid-out string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InkExtent {
    pub width: f64,
    pub height: f64,
}

/// A shaped, single-paragraph label ready for drawing.
pub struct Label {
    pub layout: parley::Layout<GlyphBrush>,
}

impl Label {
    pub fn ink_extent(&self) -> InkExtent {
        InkExtent {
            width: f64::from(self.layout.width()),
            height: f64::from(self.layout.height()),
        }
    }
}

/// Stateful helper for shaping labels against the system font collection.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape one label at the composition resolution.
    pub fn layout_label(&mut self, text: &str, font: &FontSpec, dpi: u32) -> LhResult<Label> {
        if text.is_empty() {
            return Err(LetterhuntError::validation("label text must be non-empty"));
        }

        let size_px = font.size_px(dpi);
        if !(size_px.is_finite() && size_px > 0.0) {
            return Err(LetterhuntError::validation(
                "font size must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(font.family_stack())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(if font.bold {
            parley::style::FontWeight::BOLD
        } else {
            parley::style::FontWeight::NORMAL
        }));
        builder.push_default(parley::style::StyleProperty::FontStyle(if font.italic {
            parley::style::FontStyle::Italic
        } else {
            parley::style::FontStyle::Normal
        }));
        builder.push_default(parley::style::StyleProperty::Brush(GlyphBrush::BLACK));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);

        Ok(Label { layout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_family_style_size() {
        let spec = FontSpec::parse("Noto Sans Bold 60", &FontSpec::default_word());
        assert_eq!(spec.family, "Noto Sans");
        assert!(spec.bold);
        assert!(!spec.italic);
        assert_eq!(spec.size_pt, 60.0);
    }

    #[test]
    fn parse_maps_sans_to_generic_family() {
        let spec = FontSpec::parse("sans bold 30", &FontSpec::default_distractor());
        assert_eq!(spec.family, "sans-serif");
        assert!(spec.bold);
        assert_eq!(spec.size_pt, 30.0);
    }

    #[test]
    fn parse_empty_uses_fallback() {
        let fallback = FontSpec::default_word();
        assert_eq!(FontSpec::parse("", &fallback), fallback);
        assert_eq!(FontSpec::parse("   ", &fallback), fallback);
    }

    #[test]
    fn parse_without_size_keeps_fallback_size() {
        let spec = FontSpec::parse("Liberation Serif Italic", &FontSpec::default_word());
        assert_eq!(spec.family, "Liberation Serif");
        assert!(spec.italic);
        assert_eq!(spec.size_pt, DEFAULT_WORD_SIZE_PT);
    }

    #[test]
    fn parse_style_only_descriptor() {
        let spec = FontSpec::parse("Bold 12", &FontSpec::default_word());
        assert_eq!(spec.family, "sans-serif");
        assert!(spec.bold);
        assert_eq!(spec.size_pt, 12.0);
    }

    #[test]
    fn size_scales_with_dpi() {
        let spec = FontSpec::default_word();
        assert_eq!(spec.size_px(300), 250.0);
        assert_eq!(spec.size_px(72), DEFAULT_WORD_SIZE_PT);
    }

    #[test]
    fn empty_label_is_rejected() {
        let mut engine = TextLayoutEngine::new();
        assert!(
            engine
                .layout_label("", &FontSpec::default_word(), 300)
                .is_err()
        );
    }
}
