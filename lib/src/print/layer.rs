//! Layer types for the print model.
//!
//! A [`Layer`] holds the sliced islands of one object at one z plus the
//! per-region extrusions generated for it. A [`SupportLayer`] holds the
//! support extrusions generated at one z. Both are stored in instance
//! space; per-copy shifts are applied during ordering.
//!
//! # Reference
//!
//! - `src/libslic3r/Layer.hpp` - Layer, LayerRegion, SupportLayer

use crate::extrusion::ExtrusionEntity;
use crate::geometry::{ExPolygons, Point};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A collection of layers.
pub type Layers = Vec<Layer>;

/// Extrusions of one region on one layer.
///
/// The entity vectors are grouped by island: each first-level element holds
/// one island's entities (typically a collection of loops or paths), so the
/// ordering core can sort whole islands without splitting them.
/// `perimeters[i]` and `fills[i]` describe the same island group; either
/// side may be absent when the island has no perimeters or no infill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerRegion {
    /// Index into the print's region list.
    pub region_id: usize,

    /// Perimeter extrusions, one element per island group.
    pub perimeters: Vec<ExtrusionEntity>,

    /// Infill extrusions, one element per island group.
    pub fills: Vec<ExtrusionEntity>,

    /// Ironing extrusions, printed after everything else on the layer.
    pub ironings: Vec<ExtrusionEntity>,
}

impl LayerRegion {
    /// Create an empty region for the given region id.
    pub fn new(region_id: usize) -> Self {
        Self {
            region_id,
            perimeters: Vec::new(),
            fills: Vec::new(),
            ironings: Vec::new(),
        }
    }

    /// Check whether this region carries no extrusions at all.
    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty() && self.fills.is_empty() && self.ironings.is_empty()
    }
}

/// One sliced layer of a print object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    /// Layer index within the object, 0 at the bed.
    pub id: usize,

    /// Top z of this layer in mm.
    pub print_z: CoordF,

    /// The layer's islands: closed regions of the slice.
    pub slices: ExPolygons,

    /// Per-region extrusions.
    pub regions: Vec<LayerRegion>,
}

impl Layer {
    /// Create an empty layer.
    pub fn new(id: usize, print_z: CoordF) -> Self {
        Self {
            id,
            print_z,
            slices: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Create a layer with the given islands.
    pub fn with_slices(id: usize, print_z: CoordF, slices: ExPolygons) -> Self {
        Self {
            id,
            print_z,
            slices,
            regions: Vec::new(),
        }
    }

    /// Add a region's extrusions to this layer.
    pub fn add_region(&mut self, region: LayerRegion) {
        self.regions.push(region);
    }

    /// Get a region's extrusions by region id.
    pub fn region(&self, region_id: usize) -> Option<&LayerRegion> {
        self.regions.iter().find(|r| r.region_id == region_id)
    }

    /// Number of islands on this layer.
    pub fn island_count(&self) -> usize {
        self.slices.len()
    }

    /// Check whether the layer carries no extrusions.
    pub fn is_empty(&self) -> bool {
        self.regions.iter().all(|r| r.is_empty())
    }

    /// Find the island a point belongs to.
    ///
    /// Returns the index of the slice containing the point. Points outside
    /// every slice (overhanging extrusions, bridge anchors) attach to the
    /// nearest island. Returns `None` only when the layer has no islands.
    pub fn island_index(&self, point: &Point) -> Option<usize> {
        if self.slices.is_empty() {
            return None;
        }
        for (index, slice) in self.slices.iter().enumerate() {
            if slice.contains_point(point) {
                return Some(index);
            }
        }
        let mut best = 0;
        let mut best_distance = CoordF::INFINITY;
        for (index, slice) in self.slices.iter().enumerate() {
            let distance = slice.distance_to_point(point);
            if distance < best_distance {
                best_distance = distance;
                best = index;
            }
        }
        Some(best)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layer {} (z: {:.3}mm, {} islands, {} regions)",
            self.id,
            self.print_z,
            self.slices.len(),
            self.regions.len()
        )
    }
}

/// One support layer of a print object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportLayer {
    /// Support layer index within the object.
    pub id: usize,

    /// Top z of this layer in mm.
    pub print_z: CoordF,

    /// Support extrusions: body and interface paths.
    pub support_fills: Vec<ExtrusionEntity>,
}

impl SupportLayer {
    /// Create an empty support layer.
    pub fn new(id: usize, print_z: CoordF) -> Self {
        Self {
            id,
            print_z,
            support_fills: Vec::new(),
        }
    }

    /// Check whether the layer carries no extrusions.
    pub fn is_empty(&self) -> bool {
        self.support_fills.is_empty()
    }
}

impl fmt::Display for SupportLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SupportLayer {} (z: {:.3}mm, {} entities)",
            self.id,
            self.print_z,
            self.support_fills.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ExPolygon;

    fn make_two_island_layer() -> Layer {
        // Two 10mm squares, 20mm apart.
        let left = ExPolygon::square(Point::new_scale(5.0, 5.0), crate::scale(5.0));
        let right = ExPolygon::square(Point::new_scale(35.0, 5.0), crate::scale(5.0));
        Layer::with_slices(0, 0.2, vec![left, right])
    }

    #[test]
    fn test_layer_new() {
        let layer = Layer::new(3, 0.8);
        assert_eq!(layer.id, 3);
        assert!((layer.print_z - 0.8).abs() < 1e-9);
        assert_eq!(layer.island_count(), 0);
        assert!(layer.is_empty());
    }

    #[test]
    fn test_island_index_containment() {
        let layer = make_two_island_layer();
        assert_eq!(layer.island_index(&Point::new(5_000_000, 5_000_000)), Some(0));
        assert_eq!(layer.island_index(&Point::new(35_000_000, 5_000_000)), Some(1));
    }

    #[test]
    fn test_island_index_orphan_attaches_to_nearest() {
        let layer = make_two_island_layer();
        // Between the squares but closer to the right one.
        let orphan = Point::new(28_000_000, 5_000_000);
        assert_eq!(layer.island_index(&orphan), Some(1));
        // Closer to the left one.
        let orphan = Point::new(12_000_000, 5_000_000);
        assert_eq!(layer.island_index(&orphan), Some(0));
    }

    #[test]
    fn test_island_index_empty_layer() {
        let layer = Layer::new(0, 0.2);
        assert_eq!(layer.island_index(&Point::zero()), None);
    }

    #[test]
    fn test_region_lookup() {
        let mut layer = Layer::new(0, 0.2);
        layer.add_region(LayerRegion::new(0));
        layer.add_region(LayerRegion::new(2));
        assert!(layer.region(2).is_some());
        assert!(layer.region(1).is_none());
    }

    #[test]
    fn test_layer_display() {
        let layer = make_two_island_layer();
        let text = format!("{}", layer);
        assert!(text.contains("Layer 0"));
        assert!(text.contains("2 islands"));
    }

    #[test]
    fn test_support_layer() {
        let layer = SupportLayer::new(1, 0.4);
        assert!(layer.is_empty());
        assert!(format!("{}", layer).contains("SupportLayer 1"));
    }
}
