//! Planar geometry for the laser frame
//!
//! Every stage works in the sensor frame: origin at the laser, x forward,
//! angles counter-clockwise from x.

use nalgebra::Point2;

pub type Point = Point2<f64>;

/// Published in place of a position when the tracked person is lost.
pub const LOST_SENTINEL_XY: (f64, f64) = (-100.0, -100.0);

pub fn lost_sentinel() -> Point {
    Point::new(LOST_SENTINEL_XY.0, LOST_SENTINEL_XY.1)
}

pub fn is_lost_sentinel(p: &Point) -> bool {
    p.x == LOST_SENTINEL_XY.0 && p.y == LOST_SENTINEL_XY.1
}

pub fn distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(a, b)
}

pub fn midpoint(a: &Point, b: &Point) -> Point {
    nalgebra::center(a, b)
}

pub fn polar_to_cartesian(range: f64, angle: f64) -> Point {
    Point::new(range * angle.cos(), range * angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polar_conversion() {
        let p = polar_to_cartesian(2.0, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_relative_eq!(distance(&a, &b), 5.0);
        let m = midpoint(&a, &b);
        assert_relative_eq!(m.x, 1.5);
        assert_relative_eq!(m.y, 2.0);
    }

    #[test]
    fn test_sentinel() {
        assert!(is_lost_sentinel(&lost_sentinel()));
        assert!(!is_lost_sentinel(&Point::new(-100.0, 0.0)));
    }
}
