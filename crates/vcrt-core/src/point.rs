// ABOUTME: 2D point/vector math used for beam positions and directions.
// ABOUTME: Pure value operations, no allocation.

use std::ops::{Add, Div, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, scalar: f32) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn divide(self, scalar: f32) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }

    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction.
    /// Undefined for the zero vector; use `try_normalize` when that can happen.
    pub fn normalize(self) -> Point {
        self.divide(self.magnitude())
    }

    /// Unit vector, or `None` for a zero-length vector
    pub fn try_normalize(self) -> Option<Point> {
        let magnitude = self.magnitude();
        if magnitude > f32::EPSILON {
            Some(self.divide(magnitude))
        } else {
            None
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        self.subtract(other).magnitude()
    }

    /// Same direction, given length. Undefined for the zero vector.
    pub fn scale_to_magnitude(self, magnitude: f32) -> Point {
        self.normalize().scale(magnitude)
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Distance from this point to the segment `a`-`b`.
    /// Projects onto the segment and clamps the projection to its endpoints;
    /// a zero-length segment degrades to the distance to `a`.
    pub fn distance_to_segment(self, a: Point, b: Point) -> f32 {
        let ab = b.subtract(a);
        let length_sq = ab.dot(ab);
        if length_sq <= f32::EPSILON {
            return self.distance(a);
        }
        let t = (self.subtract(a).dot(ab) / length_sq).clamp(0.0, 1.0);
        self.distance(a.add(ab.scale(t)))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::add(self, rhs)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        self.subtract(rhs)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        self.scale(rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        self.divide(rhs)
    }
}

impl From<(i16, i16)> for Point {
    fn from((x, y): (i16, i16)) -> Self {
        Self::new(x as f32, y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_of_3_4_is_5() {
        assert!((Point::new(3.0, 4.0).magnitude() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_gives_unit_length() {
        let n = Point::new(10.0, -5.0).normalize();
        assert!((n.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn try_normalize_rejects_zero_vector() {
        assert_eq!(Point::ZERO.try_normalize(), None);
    }

    #[test]
    fn scale_to_magnitude_keeps_direction() {
        let p = Point::new(0.0, 2.0).scale_to_magnitude(7.0);
        assert!((p.x).abs() < 1e-6);
        assert!((p.y - 7.0).abs() < 1e-6);
    }

    #[test]
    fn operators_match_named_functions() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a + b, a.add(b));
        assert_eq!(b - a, b.subtract(a));
        assert_eq!(a * 3.0, a.scale(3.0));
        assert_eq!(b / 2.0, b.divide(2.0));
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((Point::new(5.0, 3.0).distance_to_segment(a, b) - 3.0).abs() < 1e-6);
        assert!((Point::new(-4.0, 3.0).distance_to_segment(a, b) - 5.0).abs() < 1e-6);
        assert!((Point::new(13.0, 4.0).distance_to_segment(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn zero_length_segment_is_point_distance() {
        let a = Point::new(2.0, 2.0);
        assert!((Point::new(5.0, 6.0).distance_to_segment(a, a) - 5.0).abs() < 1e-6);
    }
}
