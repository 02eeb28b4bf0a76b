//! # Extrusion Order
//!
//! The toolpath ordering core of a 3D-printing slicer.
//!
//! Given a sliced print (per-layer geometry partitioned into islands,
//! perimeters, infill regions, support structures, and a shared wipe tower),
//! this library produces an ordered, smoothed, per-extruder sequence of
//! extrusions ready for G-code emission:
//! - Layer/instance collation across object and support layers sharing a print z
//! - Per-extruder sequencing driven by the layer's tool-ordering table
//! - Skirt/brim scheduling and wiping-override handling for multi-material prints
//! - Seam selection and greedy travel minimization over perimeter loops
//! - Path smoothing (decimation or arc fitting) behind a pluggable trait
//!
//! ## Example
//!
//! ```rust,ignore
//! use extrusion_order::{get_extrusions, DecimationSmoother, OrderingInputs};
//!
//! let smoother = DecimationSmoother::default();
//! let extrusions = get_extrusions(&inputs, &smoother)?;
//! for per_extruder in &extrusions {
//!     emit_gcode(per_extruder)?;
//! }
//! ```

// Core modules
pub mod extrusion;
pub mod gcode;
pub mod geometry;
pub mod print;

// Re-export commonly used geometry types
pub use geometry::{
    BoundingBox, ExPolygon, ExPolygons, Line, Point, PointF, Points, Polygon, Polygons, Polyline,
    Polylines,
};

// Re-export the extrusion entity model
pub use extrusion::{
    ExtrusionAttributes, ExtrusionEntity, ExtrusionEntityReference, ExtrusionLoop, ExtrusionPath,
    ExtrusionRole,
};

// Re-export the print model
pub use print::{
    Layer, LayerRegion, Print, PrintConfig, PrintInstance, PrintObject, PrintObjectConfig,
    PrintRegion, PrintRegionConfig, SupportLayer,
};

// Re-export smoothing types
pub use gcode::smooth_path::{
    ArcFitSmoother, ArcFittingConfig, DecimationSmoother, FittedArc, IdentitySmoother,
    PathSmoother, SmoothPath, SmoothPathElement, MIN_GCODE_SEGMENT_LENGTH,
    SCALED_MIN_GCODE_SEGMENT_LENGTH,
};

// Re-export shortest-path selection types
pub use gcode::shortest_path::{
    chain_entity_references, chain_open_paths, order_loops, ChainedPath, LoopOrder, OrderedLoop,
};

// Re-export tool ordering types
pub use gcode::tool_ordering::{override_entity_id, LayerTools, ToolOrdering, WipingExtrusions};

// Re-export wipe tower integration types
pub use gcode::wipe_tower::{ToolChangePlan, WipeTowerIntegration};

// Re-export the extrusion order builder
pub use gcode::extrusion_order::{
    collate_layers_to_print, get_extrusions, get_first_point, get_last_position,
    instances_to_print, ExtruderExtrusions, InfillRange, InstancePoint, InstanceToPrint,
    IslandExtrusions, LayerRef, NormalExtrusions, ObjectLayerToPrint, ObjectsLayerToPrint,
    OrderingInputs, Perimeter, SliceExtrusions,
};

/// Coordinate type used throughout the library.
/// Using i64 for integer coordinates (scaled by SCALING_FACTOR) to avoid floating-point issues.
pub type Coord = i64;

/// Floating-point coordinate type for unscaled values.
pub type CoordF = f64;

/// Scaling factor: coordinates are stored as integers scaled by this factor.
/// 1 unit = 1 nanometer, so 1mm = 1_000_000 units.
/// This matches BambuStudio/PrusaSlicer's internal scaling.
pub const SCALING_FACTOR: f64 = 1_000_000.0;

/// Epsilon for comparing unscaled (millimeter) values such as layer z heights.
pub const EPSILON: f64 = 1e-4;

/// Scale a floating-point coordinate to integer.
#[inline]
pub fn scale(v: CoordF) -> Coord {
    (v * SCALING_FACTOR).round() as Coord
}

/// Unscale an integer coordinate to floating-point.
#[inline]
pub fn unscale(v: Coord) -> CoordF {
    v as CoordF / SCALING_FACTOR
}

/// Scale a floating-point coordinate to integer (same as scale, for compatibility).
#[inline]
pub fn scaled(v: CoordF) -> Coord {
    scale(v)
}

/// Unscale an integer coordinate to floating-point (same as unscale, for compatibility).
#[inline]
pub fn unscaled(v: Coord) -> CoordF {
    unscale(v)
}

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ordering operations surfaced at the crate boundary.
///
/// Sparse or degenerate input yields empty output, never an error; errors
/// cover caller-side inconsistencies in the provided tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Skirt loop range {start}..{end} out of bounds for {count} skirt loops")]
    SkirtRange {
        start: usize,
        end: usize,
        count: usize,
    },
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling() {
        // 1mm should scale to 1_000_000
        assert_eq!(scale(1.0), 1_000_000);

        // And back
        assert!((unscale(1_000_000) - 1.0).abs() < 1e-10);

        // Test sub-millimeter precision
        assert_eq!(scale(0.001), 1_000); // 1 micron
        assert_eq!(scale(0.0001), 100); // 100 nanometers
    }
}
