//! ExPolygon type for polygons with holes.
//!
//! This module provides the ExPolygon type representing a polygon with holes
//! (exterior contour + interior hole contours), mirroring libslic3r's
//! ExPolygon class. Layer slices are ExPolygons; island assignment tests
//! entity start points against them.

use super::{BoundingBox, Point, Polygon};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A polygon with holes (exterior polygon + interior hole polygons).
///
/// The contour is the outer boundary (should be counter-clockwise for positive area).
/// The holes are interior boundaries (should be clockwise).
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExPolygon {
    /// The outer contour of the polygon.
    pub contour: Polygon,
    /// The holes (interior contours) of the polygon.
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    /// Create a new ExPolygon with only a contour and no holes.
    #[inline]
    pub fn new(contour: Polygon) -> Self {
        Self {
            contour,
            holes: Vec::new(),
        }
    }

    /// Create a new ExPolygon with a contour and holes.
    #[inline]
    pub fn with_holes(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self { contour, holes }
    }

    /// Check if the ExPolygon is empty (no contour points).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// Get the number of holes.
    #[inline]
    pub fn hole_count(&self) -> usize {
        self.holes.len()
    }

    /// Check if this ExPolygon has any holes.
    #[inline]
    pub fn has_holes(&self) -> bool {
        !self.holes.is_empty()
    }

    /// Add a hole to the ExPolygon.
    #[inline]
    pub fn add_hole(&mut self, hole: Polygon) {
        self.holes.push(hole);
    }

    /// Calculate the area of the ExPolygon (contour area minus hole areas).
    pub fn area(&self) -> CoordF {
        let contour_area = self.contour.area();
        let holes_area: CoordF = self.holes.iter().map(|h| h.area()).sum();
        contour_area - holes_area
    }

    /// Calculate the total perimeter (contour + all holes).
    pub fn perimeter(&self) -> CoordF {
        let contour_perim = self.contour.perimeter();
        let holes_perim: CoordF = self.holes.iter().map(|h| h.perimeter()).sum();
        contour_perim + holes_perim
    }

    /// Get the bounding box of the ExPolygon (same as contour's bounding box).
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.contour.bounding_box()
    }

    /// Check if a point is inside the ExPolygon (inside contour and not inside any hole).
    pub fn contains_point(&self, p: &Point) -> bool {
        if !self.contour.contains_point(p) {
            return false;
        }

        for hole in &self.holes {
            if hole.contains_point(p) {
                return false;
            }
        }

        true
    }

    /// Get the centroid of the ExPolygon.
    /// This is an approximation that uses the contour's centroid.
    #[inline]
    pub fn centroid(&self) -> Point {
        self.contour.centroid()
    }

    /// Translate the ExPolygon by a vector.
    pub fn translate(&mut self, v: Point) {
        self.contour.translate(v);
        for hole in &mut self.holes {
            hole.translate(v);
        }
    }

    /// Return a translated copy of the ExPolygon.
    pub fn translated(&self, v: Point) -> Self {
        let mut result = self.clone();
        result.translate(v);
        result
    }

    /// Check if the ExPolygon is valid.
    pub fn is_valid(&self) -> bool {
        if !self.contour.is_valid() {
            return false;
        }

        for hole in &self.holes {
            if !hole.is_valid() {
                return false;
            }
        }

        true
    }

    /// Distance from a point to the contour boundary.
    pub fn distance_to_point(&self, p: &Point) -> CoordF {
        let closest = self.contour.closest_point(p);
        p.distance(&closest)
    }

    /// Create a rectangular ExPolygon.
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::new(Polygon::rectangle(min, max))
    }

    /// Create a square ExPolygon.
    pub fn square(center: Point, half_size: crate::Coord) -> Self {
        Self::new(Polygon::square(center, half_size))
    }
}

impl fmt::Debug for ExPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExPolygon(contour: {} points, {} holes)",
            self.contour.len(),
            self.holes.len()
        )
    }
}

impl fmt::Display for ExPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExPolygon[contour: {}", self.contour)?;
        for (i, hole) in self.holes.iter().enumerate() {
            write!(f, ", hole{}: {}", i, hole)?;
        }
        write!(f, "]")
    }
}

impl From<Polygon> for ExPolygon {
    fn from(polygon: Polygon) -> Self {
        Self::new(polygon)
    }
}

impl From<ExPolygon> for Polygon {
    /// Convert to the contour polygon, discarding holes.
    fn from(expoly: ExPolygon) -> Self {
        expoly.contour
    }
}

/// Type alias for a collection of ExPolygons.
pub type ExPolygons = Vec<ExPolygon>;
