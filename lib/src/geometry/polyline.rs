//! Polyline type for open paths.
//!
//! Polylines carry the centerlines of open extrusions (infill lines, gap
//! fill, support interfaces) and the cut-open form of perimeter loops after
//! seam selection. They are the unit the path smoother consumes.

use super::{Line, Lines, Point};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// An open path represented as a sequence of points.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
}

impl Polyline {
    /// Create an empty polyline.
    #[inline]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a polyline from a vector of points.
    #[inline]
    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create an empty polyline with preallocated capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Append a point to the polyline.
    #[inline]
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Append all points of another polyline.
    pub fn append(&mut self, other: &Polyline) {
        self.points.extend_from_slice(&other.points);
    }

    /// First point of the polyline. Panics on an empty polyline.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.points[0]
    }

    /// Last point of the polyline. Panics on an empty polyline.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// A polyline is valid if it has at least two points.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 2
    }

    /// Check whether the first and last points coincide exactly.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points[0] == self.points[self.points.len() - 1]
    }

    /// Total length of the polyline in scaled units.
    pub fn length(&self) -> CoordF {
        self.points
            .windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }

    /// Reverse the point order in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Return a reversed copy.
    pub fn reversed(&self) -> Self {
        let mut p = self.clone();
        p.reverse();
        p
    }

    /// The polyline's segments as lines.
    pub fn lines(&self) -> Lines {
        self.points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]))
            .collect()
    }
}

impl std::fmt::Debug for Polyline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Polyline({} points)", self.points.len())
    }
}

impl Deref for Polyline {
    type Target = Vec<Point>;

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl DerefMut for Polyline {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.points
    }
}

impl FromIterator<Point> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Polyline {
    type Item = Point;
    type IntoIter = std::vec::IntoIter<Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Polyline {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Type alias for a collection of polylines.
pub type Polylines = Vec<Polyline>;

#[cfg(test)]
mod tests {
    use super::*;

    fn make_polyline() -> Polyline {
        Polyline::from_points(vec![
            Point::new(0, 0),
            Point::new(1_000_000, 0),
            Point::new(1_000_000, 1_000_000),
        ])
    }

    #[test]
    fn test_polyline_length() {
        let p = make_polyline();
        // Two 1mm segments
        assert!((p.length() - 2_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_polyline_endpoints() {
        let p = make_polyline();
        assert_eq!(p.first_point(), Point::new(0, 0));
        assert_eq!(p.last_point(), Point::new(1_000_000, 1_000_000));
    }

    #[test]
    fn test_polyline_reverse() {
        let p = make_polyline();
        let r = p.reversed();
        assert_eq!(r.first_point(), p.last_point());
        assert_eq!(r.last_point(), p.first_point());
        // Length is direction-independent
        assert!((r.length() - p.length()).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_is_valid() {
        assert!(!Polyline::new().is_valid());
        assert!(!Polyline::from_points(vec![Point::zero()]).is_valid());
        assert!(make_polyline().is_valid());
    }

    #[test]
    fn test_polyline_lines() {
        let p = make_polyline();
        let lines = p.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].a, Point::new(0, 0));
        assert_eq!(lines[1].b, Point::new(1_000_000, 1_000_000));
    }
}
