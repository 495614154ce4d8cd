//! Points and displacements on the canvas plane.
//!
//! Canvas units, origin top-left, y grows downward. `Point2` is a location,
//! `Vec2` is a displacement between locations; only the algebraically valid
//! combinations are implemented, so adding two points (or subtracting a
//! point from a vector) fails to compile.

use std::ops::{Add, Mul, Sub};

use crate::error::{LetterhuntError, LhResult};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length vector in the same direction.
    ///
    /// Fails for the zero vector, whose direction is undefined.
    pub fn unit(self) -> LhResult<Vec2> {
        let m = self.magnitude();
        if m == 0.0 {
            return Err(LetterhuntError::DegenerateVector);
        }
        Ok(self * (1.0 / m))
    }
}

impl Sub for Point2 {
    type Output = Vec2;

    fn sub(self, other: Point2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Sub<Vec2> for Point2 {
    type Output = Point2;

    fn sub(self, v: Vec2) -> Point2 {
        Point2::new(self.x - v.x, self.y - v.y)
    }
}

impl Add<Vec2> for Point2 {
    type Output = Point2;

    fn add(self, v: Vec2) -> Point2 {
        Point2::new(self.x + v.x, self.y + v.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, scalar: f64) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl From<Point2> for kurbo::Point {
    fn from(p: Point2) -> kurbo::Point {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<Vec2> for kurbo::Vec2 {
    fn from(v: Vec2) -> kurbo::Vec2 {
        kurbo::Vec2::new(v.x, v.y)
    }
}
