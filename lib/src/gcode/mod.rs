//! G-code preparation module.
//!
//! This module turns sliced layers into the per-extruder extrusion order the
//! G-code export consumes: tool ordering across layers, seam and travel
//! optimization within a layer, smooth path generation, and the wipe tower
//! tool change plan.

pub mod extrusion_order;
pub mod shortest_path;
pub mod smooth_path;
pub mod tool_ordering;
pub mod wipe_tower;

pub use extrusion_order::{
    collate_layers_to_print, get_extrusions, get_first_point, get_last_position,
    instances_to_print, ExtruderExtrusions, InfillRange, InstancePoint, InstanceToPrint,
    IslandExtrusions, LayerRef, NormalExtrusions, ObjectLayerToPrint, ObjectsLayerToPrint,
    OrderingInputs, Perimeter, SliceExtrusions,
};
pub use shortest_path::{
    chain_entity_references, chain_open_paths, order_loops, ChainedPath, LoopOrder, OrderedLoop,
};
pub use smooth_path::{
    ArcFitSmoother, ArcFittingConfig, DecimationSmoother, FittedArc, IdentitySmoother,
    PathSmoother, SmoothPath, SmoothPathElement, MIN_GCODE_SEGMENT_LENGTH,
    SCALED_MIN_GCODE_SEGMENT_LENGTH,
};
pub use tool_ordering::{override_entity_id, LayerTools, ToolOrdering, WipingExtrusions};
pub use wipe_tower::{ToolChangePlan, WipeTowerIntegration};
