//! Planar geometry foundation for toolpath ordering.
//!
//! All coordinates are scaled integers (`Coord = i64`, 1 unit = 1 nanometer)
//! so distance comparisons, seam lookups, and travel ordering are exact and
//! reproducible. Products that could overflow i64 are widened to i128.

pub mod bounding_box;
pub mod expolygon;
pub mod line;
pub mod point;
pub mod polygon;
pub mod polyline;

pub use bounding_box::{BoundingBox, BoundingBoxF};
pub use expolygon::{ExPolygon, ExPolygons};
pub use line::{Line, Lines};
pub use point::{Point, PointF, Points, PointsF};
pub use polygon::{Polygon, Polygons};
pub use polyline::{Polyline, Polylines};

use crate::{Coord, CoordF};

/// 2D cross product of vectors `a` and `b`, widened to i128.
#[inline]
pub fn cross2(a: Point, b: Point) -> i128 {
    (a.x as i128) * (b.y as i128) - (a.y as i128) * (b.x as i128)
}

/// 2D dot product of vectors `a` and `b`, widened to i128.
#[inline]
pub fn dot2(a: Point, b: Point) -> i128 {
    (a.x as i128) * (b.x as i128) + (a.y as i128) * (b.y as i128)
}

/// Linear interpolation between two points, `t` in [0, 1].
#[inline]
pub fn lerp(a: Point, b: Point, t: CoordF) -> Point {
    Point::new(
        (a.x as CoordF + (b.x - a.x) as CoordF * t).round() as Coord,
        (a.y as CoordF + (b.y - a.y) as CoordF * t).round() as Coord,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross2() {
        assert_eq!(cross2(Point::new(1, 0), Point::new(0, 1)), 1);
        assert_eq!(cross2(Point::new(0, 1), Point::new(1, 0)), -1);
        assert_eq!(cross2(Point::new(2, 2), Point::new(4, 4)), 0);
    }

    #[test]
    fn test_dot2() {
        assert_eq!(dot2(Point::new(3, 4), Point::new(2, 5)), 26);
        assert_eq!(dot2(Point::new(1, 0), Point::new(0, 1)), 0);
    }

    #[test]
    fn test_lerp() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 20);
        assert_eq!(lerp(a, b, 0.0), a);
        assert_eq!(lerp(a, b, 1.0), b);
        assert_eq!(lerp(a, b, 0.5), Point::new(5, 10));
    }
}
