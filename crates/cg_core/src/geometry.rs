//! Court geometry
//!
//! Positions are court-scaled units as delivered by the tracking feed
//! (x: 0-100 baseline to baseline, y: 0-50 sideline to sideline).

use serde::{Deserialize, Serialize};

/// A 2D position on the court.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point (see [`euclidean_distance`]).
    #[inline]
    pub fn distance_to(&self, other: &Point) -> f64 {
        euclidean_distance(*self, *other)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
///
/// Never negative; coincident points yield exactly `0.0`.
#[inline]
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_four_five() {
        let d = euclidean_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_eq!(d, 5.0);
    }

    #[test]
    fn test_identical_points_are_zero() {
        let p = Point::new(47.3, 12.9);
        assert_eq!(euclidean_distance(p, p), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let a = Point::new(10.0, 25.0);
        let b = Point::new(88.75, 25.0);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
        assert!((a.distance_to(&b) - 78.75).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }
}
