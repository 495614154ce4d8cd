//! Exclusion-aware random placement of distractors.

use crate::{boundary::ExclusionBoundary, layout::Canvas, model::Distractor, space::Point2};

/// Retry budget before a placement gives up on the exclusion region.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;

/// Deterministic uniform generator for anchor candidates (splitmix64).
/// Seeding is the caller's concern; the same seed replays the same sheet.
#[derive(Clone, Debug)]
pub struct PlacementRng {
    state: u64,
}

impl PlacementRng {
    pub fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform point in [0, width) x [0, height).
    pub fn point_in(&mut self, canvas: Canvas) -> Point2 {
        Point2::new(
            self.next_f64() * f64::from(canvas.width),
            self.next_f64() * f64::from(canvas.height),
        )
    }
}

/// A placed distractor plus whether the exclusion region had to be ignored.
#[derive(Clone, Debug)]
pub struct Placement {
    pub distractor: Distractor,
    pub degraded: bool,
}

/// Draw anchor candidates until one falls outside the exclusion region.
///
/// After [`MAX_PLACEMENT_ATTEMPTS`] rejections the last candidate is kept
/// regardless of the region (a region covering the whole canvas would
/// otherwise never terminate) and the placement is marked degraded.
pub fn place_distractor(
    text: impl Into<String>,
    canvas: Canvas,
    exclusion: &ExclusionBoundary,
    rng: &mut PlacementRng,
) -> Placement {
    let text = text.into();
    let mut candidate = rng.point_in(canvas);
    let mut attempts = 1u32;

    while exclusion.contains(candidate) {
        if attempts >= MAX_PLACEMENT_ATTEMPTS {
            tracing::warn!(
                text = %text,
                attempts,
                "placement degraded: exclusion region not satisfied within retry budget"
            );
            return Placement {
                distractor: Distractor::new(text, candidate),
                degraded: true,
            };
        }
        candidate = rng.point_in(canvas);
        attempts += 1;
    }

    Placement {
        distractor: Distractor::new(text, candidate),
        degraded: false,
    }
}
