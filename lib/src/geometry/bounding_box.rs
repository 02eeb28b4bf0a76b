//! Axis-aligned bounding box types for 2D geometry.
//!
//! This module provides the BoundingBox type used for coarse containment
//! checks during island assignment, mirroring libslic3r's BoundingBox class.

use super::{Point, PointF};
use crate::{unscale, Coord, CoordF};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D axis-aligned bounding box with scaled integer coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
    defined: bool,
}

impl BoundingBox {
    /// Create a new empty (undefined) bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: Point::new(Coord::MAX, Coord::MAX),
            max: Point::new(Coord::MIN, Coord::MIN),
            defined: false,
        }
    }

    /// Create a bounding box from min and max points.
    #[inline]
    pub fn from_points_minmax(min: Point, max: Point) -> Self {
        Self {
            min,
            max,
            defined: true,
        }
    }

    /// Create a bounding box from a slice of points.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Self::new();
        for p in points {
            bb.merge_point(*p);
        }
        bb
    }

    /// Check if the bounding box is defined (has been merged with at least one point).
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Check if the bounding box is empty (not defined).
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: Point) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Merge another bounding box into this one.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.defined {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    /// Get the width of the bounding box.
    #[inline]
    pub fn width(&self) -> Coord {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0
        }
    }

    /// Get the height of the bounding box.
    #[inline]
    pub fn height(&self) -> Coord {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0
        }
    }

    /// Get the size as a point (width, height).
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width(), self.height())
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    /// Check if a point is inside the bounding box.
    #[inline]
    pub fn contains_point(&self, p: &Point) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }

    /// Check if this bounding box intersects another bounding box.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.defined
            && other.defined
            && self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Expand the bounding box by a margin on all sides.
    pub fn expand(&mut self, margin: Coord) {
        if self.defined {
            self.min.x -= margin;
            self.min.y -= margin;
            self.max.x += margin;
            self.max.y += margin;
        }
    }

    /// Return a copy grown by a margin on all sides.
    pub fn inflated(&self, margin: Coord) -> Self {
        let mut result = *self;
        result.expand(margin);
        result
    }

    /// Translate the bounding box by a vector.
    pub fn translate(&mut self, v: Point) {
        if self.defined {
            self.min = self.min + v;
            self.max = self.max + v;
        }
    }

    /// Return a translated copy of the bounding box.
    pub fn translated(&self, v: Point) -> Self {
        let mut result = *self;
        result.translate(v);
        result
    }

    /// Convert to a floating-point bounding box.
    #[inline]
    pub fn to_f64(&self) -> BoundingBoxF {
        BoundingBoxF {
            min: self.min.to_f64(),
            max: self.max.to_f64(),
            defined: self.defined,
        }
    }
}

impl fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBox({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBox(undefined)")
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(
                f,
                "[({:.6}, {:.6}) - ({:.6}, {:.6})]",
                unscale(self.min.x),
                unscale(self.min.y),
                unscale(self.max.x),
                unscale(self.max.y)
            )
        } else {
            write!(f, "[undefined]")
        }
    }
}

/// A 2D axis-aligned bounding box with floating-point coordinates (in mm).
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxF {
    pub min: PointF,
    pub max: PointF,
    defined: bool,
}

impl BoundingBoxF {
    /// Create a new empty bounding box.
    #[inline]
    pub fn new() -> Self {
        Self {
            min: PointF::new(CoordF::MAX, CoordF::MAX),
            max: PointF::new(CoordF::MIN, CoordF::MIN),
            defined: false,
        }
    }

    /// Check if the bounding box is defined.
    #[inline]
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Merge a point into the bounding box.
    pub fn merge_point(&mut self, p: PointF) {
        if self.defined {
            self.min.x = self.min.x.min(p.x);
            self.min.y = self.min.y.min(p.y);
            self.max.x = self.max.x.max(p.x);
            self.max.y = self.max.y.max(p.y);
        } else {
            self.min = p;
            self.max = p;
            self.defined = true;
        }
    }

    /// Get the width.
    #[inline]
    pub fn width(&self) -> CoordF {
        if self.defined {
            self.max.x - self.min.x
        } else {
            0.0
        }
    }

    /// Get the height.
    #[inline]
    pub fn height(&self) -> CoordF {
        if self.defined {
            self.max.y - self.min.y
        } else {
            0.0
        }
    }

    /// Get the center.
    #[inline]
    pub fn center(&self) -> PointF {
        PointF::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Check if a point is inside.
    #[inline]
    pub fn contains_point(&self, p: &PointF) -> bool {
        self.defined
            && p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
    }
}

impl fmt::Debug for BoundingBoxF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.defined {
            write!(f, "BoundingBoxF({:?} - {:?})", self.min, self.max)
        } else {
            write!(f, "BoundingBoxF(undefined)")
        }
    }
}

impl From<BoundingBox> for BoundingBoxF {
    fn from(bb: BoundingBox) -> Self {
        bb.to_f64()
    }
}
