//! The user-drawn exclusion region.
//!
//! An ordered polyline of canvas points plus a `closed` display flag. The
//! flag only controls whether the drawn outline connects the last point back
//! to the first; containment always treats the boundary as implicitly
//! closed.

use crate::{
    error::{LetterhuntError, LhResult},
    space::Point2,
};

const EDGE_EPS: f64 = 1e-9;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExclusionBoundary {
    points: Vec<Point2>,
    pub closed: bool,
}

impl ExclusionBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Append a vertex in drawing order.
    pub fn push(&mut self, point: Point2) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Even-odd ray-cast containment over the implicitly closed boundary.
    ///
    /// Fewer than 3 vertices enclose no area, so nothing is contained. A
    /// point lying exactly on a boundary segment counts as inside; the rule
    /// is applied by an explicit segment test rather than left to the
    /// crossing arithmetic.
    pub fn contains(&self, p: Point2) -> bool {
        let pts = &self.points;
        let n = pts.len();
        if n < 3 {
            return false;
        }

        let mut j = n - 1;
        for i in 0..n {
            if on_segment(pts[j], pts[i], p) {
                return true;
            }
            j = i;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (pts[i], pts[j]);
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = b.x + (p.y - b.y) * (a.x - b.x) / (a.y - b.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Shoelace area of the implicitly closed boundary.
    pub fn enclosed_area(&self) -> LhResult<f64> {
        let pts = &self.points;
        if pts.len() < 3 {
            return Err(LetterhuntError::invalid_boundary(format!(
                "an enclosed area needs at least 3 points, got {}",
                pts.len()
            )));
        }

        let mut twice_area = 0.0;
        let mut j = pts.len() - 1;
        for i in 0..pts.len() {
            twice_area += pts[j].x * pts[i].y - pts[i].x * pts[j].y;
            j = i;
        }
        Ok(twice_area.abs() / 2.0)
    }
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    let ab = b - a;
    let ap = p - a;
    let cross = ab.x * ap.y - ab.y * ap.x;
    if cross.abs() > EDGE_EPS {
        return false;
    }
    let along = ap.dot(ab);
    (-EDGE_EPS..=ab.dot(ab) + EDGE_EPS).contains(&along)
}
