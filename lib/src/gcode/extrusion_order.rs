//! Extrusion ordering for G-code export.
//!
//! # Overview
//!
//! The order builder is the top-level pass between slicing and G-code
//! emission. For one print z it walks the extruders of the layer's tool
//! table and produces one [`ExtruderExtrusions`] entry per extruder: skirt
//! loops, brim, wiping-override extrusions, support, and per-island
//! perimeters, infill, and ironing, each ordered for minimal travel and
//! already smoothed. The returned vector's order is the print order; the
//! writer only interleaves wipe tower moves at the recorded tool changes.
//!
//! Geometry stays owned by the print model. The builder reorders borrows
//! and produces new smoothed-path values; a running nozzle cursor carries
//! across skirt, brim, instances, and extruders so every ordering decision
//! sees the true travel start.
//!
//! # Reference
//!
//! - `src/libslic3r/GCode/ExtrusionOrder.hpp`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extrusion::{ExtrusionEntity, ExtrusionEntityReference, ExtrusionRole};
use crate::gcode::shortest_path::{
    chain_entity_references, chain_open_paths, order_loops, ChainedPath, OrderedLoop,
};
use crate::gcode::smooth_path::{PathSmoother, SmoothPath};
use crate::gcode::tool_ordering::{override_entity_id, LayerTools};
use crate::gcode::wipe_tower::{ToolChangePlan, WipeTowerIntegration};
use crate::geometry::Point;
use crate::print::{Layer, Print, PrintObject, PrintObjectConfig, PrintRegion, SupportLayer};
use crate::{Error, Result, EPSILON};

/// A point in instance-local coordinates.
///
/// Geometry is stored once per object; each printed copy shifts it by its
/// instance offset. The cursor inside one instance runs in instance space
/// and is translated to and from print space at the instance boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstancePoint(pub Point);

impl InstancePoint {
    /// Translate a print-space point into the instance frame.
    pub fn from_print_space(point: Point, shift: Point) -> Self {
        Self(point - shift)
    }

    /// Translate back into print space.
    pub fn to_print_space(self, shift: Point) -> Point {
        self.0 + shift
    }
}

/// The object layer and support layer sharing one print z.
///
/// At least one of the two is always present, so the pairing is a
/// three-case variant instead of two options.
#[derive(Debug, Clone, Copy)]
pub enum ObjectLayerToPrint<'a> {
    /// Only the object itself prints at this z.
    ObjectOnly {
        object: &'a PrintObject,
        layer: &'a Layer,
    },
    /// Only support prints at this z.
    SupportOnly {
        object: &'a PrintObject,
        support_layer: &'a SupportLayer,
    },
    /// Object and support share this z.
    Both {
        object: &'a PrintObject,
        layer: &'a Layer,
        support_layer: &'a SupportLayer,
    },
}

/// All collated entries of one print z.
pub type ObjectsLayerToPrint<'a> = Vec<ObjectLayerToPrint<'a>>;

/// Whichever layer anchors a collated entry.
#[derive(Debug, Clone, Copy)]
pub enum LayerRef<'a> {
    Object(&'a Layer),
    Support(&'a SupportLayer),
}

impl LayerRef<'_> {
    /// Print z in mm.
    pub fn print_z(&self) -> f64 {
        match self {
            LayerRef::Object(layer) => layer.print_z,
            LayerRef::Support(layer) => layer.print_z,
        }
    }

    /// Layer id within its object.
    pub fn id(&self) -> usize {
        match self {
            LayerRef::Object(layer) => layer.id,
            LayerRef::Support(layer) => layer.id,
        }
    }
}

impl<'a> ObjectLayerToPrint<'a> {
    /// The owning print object.
    pub fn object(&self) -> &'a PrintObject {
        match *self {
            ObjectLayerToPrint::ObjectOnly { object, .. }
            | ObjectLayerToPrint::SupportOnly { object, .. }
            | ObjectLayerToPrint::Both { object, .. } => object,
        }
    }

    /// The object layer, when present.
    pub fn object_layer(&self) -> Option<&'a Layer> {
        match *self {
            ObjectLayerToPrint::ObjectOnly { layer, .. }
            | ObjectLayerToPrint::Both { layer, .. } => Some(layer),
            ObjectLayerToPrint::SupportOnly { .. } => None,
        }
    }

    /// The support layer, when present.
    pub fn support_layer(&self) -> Option<&'a SupportLayer> {
        match *self {
            ObjectLayerToPrint::SupportOnly { support_layer, .. }
            | ObjectLayerToPrint::Both { support_layer, .. } => Some(support_layer),
            ObjectLayerToPrint::ObjectOnly { .. } => None,
        }
    }

    /// The object layer when present, else the support layer.
    pub fn layer(&self) -> LayerRef<'a> {
        match *self {
            ObjectLayerToPrint::ObjectOnly { layer, .. }
            | ObjectLayerToPrint::Both { layer, .. } => LayerRef::Object(layer),
            ObjectLayerToPrint::SupportOnly { support_layer, .. } => {
                LayerRef::Support(support_layer)
            }
        }
    }

    /// Print z of this entry: the average when object and support differ.
    pub fn print_z(&self) -> f64 {
        match *self {
            ObjectLayerToPrint::ObjectOnly { layer, .. } => layer.print_z,
            ObjectLayerToPrint::SupportOnly { support_layer, .. } => support_layer.print_z,
            ObjectLayerToPrint::Both {
                layer,
                support_layer,
                ..
            } => 0.5 * (layer.print_z + support_layer.print_z),
        }
    }
}

/// Merge an object's layers and support layers into ascending print z,
/// pairing an object layer and a support layer into one entry when their
/// print z coincide within epsilon.
pub fn collate_layers_to_print(object: &PrintObject) -> ObjectsLayerToPrint<'_> {
    let mut collated = Vec::with_capacity(object.layers.len() + object.support_layers.len());
    let mut layer_index = 0;
    let mut support_index = 0;
    loop {
        match (
            object.layers.get(layer_index),
            object.support_layers.get(support_index),
        ) {
            (Some(layer), Some(support_layer)) => {
                if (layer.print_z - support_layer.print_z).abs() < EPSILON {
                    collated.push(ObjectLayerToPrint::Both {
                        object,
                        layer,
                        support_layer,
                    });
                    layer_index += 1;
                    support_index += 1;
                } else if layer.print_z < support_layer.print_z {
                    collated.push(ObjectLayerToPrint::ObjectOnly { object, layer });
                    layer_index += 1;
                } else {
                    collated.push(ObjectLayerToPrint::SupportOnly {
                        object,
                        support_layer,
                    });
                    support_index += 1;
                }
            }
            (Some(layer), None) => {
                collated.push(ObjectLayerToPrint::ObjectOnly { object, layer });
                layer_index += 1;
            }
            (None, Some(support_layer)) => {
                collated.push(ObjectLayerToPrint::SupportOnly {
                    object,
                    support_layer,
                });
                support_index += 1;
            }
            (None, None) => break,
        }
    }
    collated
}

/// One instance copy being printed at the current print z.
#[derive(Debug, Clone, Copy)]
pub struct InstanceToPrint<'a> {
    /// Index into the collated layer list.
    pub layer_index: usize,
    /// The object being copied.
    pub object: &'a PrintObject,
    /// Which copy of the object.
    pub instance_index: usize,
}

impl InstanceToPrint<'_> {
    /// The copy's print-space shift.
    pub fn shift(&self) -> Point {
        self.object
            .instances
            .get(self.instance_index)
            .map(|instance| instance.shift)
            .unwrap_or(Point::zero())
    }
}

/// Flatten every (layer entry, instance copy) pair in stable order.
pub fn instances_to_print<'a>(layers: &ObjectsLayerToPrint<'a>) -> Vec<InstanceToPrint<'a>> {
    let mut instances = Vec::new();
    for (layer_index, entry) in layers.iter().enumerate() {
        let object = entry.object();
        for instance_index in 0..object.instances.len() {
            instances.push(InstanceToPrint {
                layer_index,
                object,
                instance_index,
            });
        }
    }
    instances
}

/// One smoothed perimeter loop in print order.
#[derive(Debug, Clone)]
pub struct Perimeter<'a> {
    /// The smoothed toolpath, instance space.
    pub smooth_path: SmoothPath,

    /// Whether the loop runs opposite to its stored orientation.
    pub reversed: bool,

    /// The source entity, for role and width metadata.
    pub extrusion_entity: &'a ExtrusionEntity,
}

/// A batch of smoothed infill paths sharing one print region.
#[derive(Debug, Clone)]
pub struct InfillRange<'a> {
    /// Smoothed paths in print order.
    pub items: Vec<SmoothPath>,

    /// The region supplying material settings.
    pub region: &'a PrintRegion,
}

/// The ordered extrusions of one island: perimeters, then its infill.
#[derive(Debug, Clone)]
pub struct IslandExtrusions<'a> {
    /// The region the island belongs to.
    pub region: &'a PrintRegion,

    /// Perimeter loops in print order.
    pub perimeters: Vec<Perimeter<'a>>,

    /// Infill batches in print order.
    pub infill_ranges: Vec<InfillRange<'a>>,
}

impl<'a> IslandExtrusions<'a> {
    pub fn new(region: &'a PrintRegion) -> Self {
        Self {
            region,
            perimeters: Vec::new(),
            infill_ranges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty() && self.infill_ranges.is_empty()
    }
}

/// The islands of one slice plus its trailing ironing pass.
#[derive(Debug, Clone, Default)]
pub struct SliceExtrusions<'a> {
    /// Perimeters and infill of every island, islands in print order.
    pub common_extrusions: Vec<IslandExtrusions<'a>>,

    /// Ironing applied after every island of this slice.
    pub ironing_extrusions: Vec<InfillRange<'a>>,
}

impl SliceExtrusions<'_> {
    pub fn is_empty(&self) -> bool {
        self.common_extrusions.is_empty() && self.ironing_extrusions.is_empty()
    }
}

/// Extrusions of one instance copy under one extruder.
#[derive(Debug, Clone)]
pub struct NormalExtrusions<'a> {
    /// Shift of the instance copy, print space.
    pub instance_offset: Point,

    /// Smoothed support paths, printed before the object slices.
    pub support_extrusions: Vec<SmoothPath>,

    /// One entry per slice of the layer.
    pub slices_extrusions: Vec<SliceExtrusions<'a>>,
}

impl NormalExtrusions<'_> {
    pub fn new(instance_offset: Point) -> Self {
        Self {
            instance_offset,
            support_extrusions: Vec::new(),
            slices_extrusions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.support_extrusions.is_empty()
            && self.slices_extrusions.iter().all(|slice| slice.is_empty())
    }
}

/// Everything one extruder prints at one print z, in print order.
#[derive(Debug, Clone)]
pub struct ExtruderExtrusions<'a> {
    /// The 0-based extruder id.
    pub extruder_id: u32,

    /// Skirt loops paired with their global loop index.
    pub skirt: Vec<(usize, SmoothPath)>,

    /// Brim paths, present only while the brim is pending.
    pub brim: Vec<SmoothPath>,

    /// Wiping-override slices, one inner list per instance, parallel to
    /// `normal_extrusions`.
    pub overridden_extrusions: Vec<Vec<SliceExtrusions<'a>>>,

    /// Per-instance support and slice extrusions.
    pub normal_extrusions: Vec<NormalExtrusions<'a>>,

    /// Wipe tower plan for the switch into this extruder, when planned.
    pub tool_change: Option<ToolChangePlan>,
}

impl ExtruderExtrusions<'_> {
    pub fn new(extruder_id: u32) -> Self {
        Self {
            extruder_id,
            skirt: Vec::new(),
            brim: Vec::new(),
            overridden_extrusions: Vec::new(),
            normal_extrusions: Vec::new(),
            tool_change: None,
        }
    }

    /// Check if this extruder has nothing to print at this z. The writer
    /// skips empty entries without tool-change overhead.
    pub fn is_empty(&self) -> bool {
        self.skirt.is_empty()
            && self.brim.is_empty()
            && self
                .overridden_extrusions
                .iter()
                .all(|slices| slices.iter().all(|slice| slice.is_empty()))
            && self.normal_extrusions.iter().all(|normal| normal.is_empty())
    }
}

/// Read-only inputs for one [`get_extrusions`] call.
#[derive(Debug, Clone, Copy)]
pub struct OrderingInputs<'a> {
    /// The whole print model.
    pub print: &'a Print,

    /// Wipe tower lookup, when a tower is printed.
    pub wipe_tower: Option<&'a WipeTowerIntegration>,

    /// Collated layer entries for this print z.
    pub layers: &'a [ObjectLayerToPrint<'a>],

    /// Whether this is the first layer of the print.
    pub is_first_layer: bool,

    /// Extruders active at this print z, in order.
    pub layer_tools: &'a LayerTools,

    /// Flattened instance copies sharing this print z.
    pub instances_to_print: &'a [InstanceToPrint<'a>],

    /// Per-extruder `[start, end)` ranges into the print's skirt loops.
    pub skirt_loops_per_extruder: &'a BTreeMap<u32, (usize, usize)>,

    /// Extruder active before this print z begins.
    pub current_extruder_id: Option<u32>,

    /// Whether brim extrusions are still pending.
    pub get_brim: bool,

    /// Nozzle position carried from the previous print z, print space.
    pub previous_position: Option<Point>,
}

/// Build the full per-extruder extrusion order for one print z.
///
/// The returned vector holds one entry per extruder of the layer in print
/// order, including entries with nothing to print. Degenerate geometry
/// yields empty ranges; only caller-side inconsistencies (a skirt range
/// outside the print's skirt loops) surface as errors.
pub fn get_extrusions<'a>(
    inputs: &OrderingInputs<'a>,
    smooth_path: &dyn PathSmoother,
) -> Result<Vec<ExtruderExtrusions<'a>>> {
    let print = inputs.print;
    let layer_tools = inputs.layer_tools;

    // Layer context handed to the smoother for print-level entities; a
    // support-only z has no object layer to borrow.
    let fallback_layer;
    let context_layer: &Layer = match inputs.layers.iter().find_map(|entry| entry.object_layer()) {
        Some(layer) => layer,
        None => {
            fallback_layer = Layer::new(0, layer_tools.print_z);
            &fallback_layer
        }
    };

    let mut previous_position = inputs.previous_position;
    let mut active_extruder = inputs.current_extruder_id;
    let mut extrusions: Vec<ExtruderExtrusions<'a>> =
        Vec::with_capacity(layer_tools.extruders.len());

    for &extruder_id in &layer_tools.extruders {
        let mut extruder_extrusions = ExtruderExtrusions::new(extruder_id);

        // Record the wipe tower plan when a tool change boundary is
        // crossed; the first extruder of the first layer records the
        // initial prime.
        let crossing = match active_extruder {
            Some(active) => active != extruder_id,
            None => inputs.is_first_layer,
        };
        if crossing {
            if let Some(wipe_tower) = inputs.wipe_tower {
                extruder_extrusions.tool_change = wipe_tower
                    .tool_change(layer_tools.print_z, extruder_id)
                    .copied();
            }
        }
        active_extruder = Some(extruder_id);

        // Skirt loops assigned to this extruder. Skirt entities live in
        // print space, so the cursor needs no instance shift.
        if let Some(&(start, end)) = inputs.skirt_loops_per_extruder.get(&extruder_id) {
            if start > end || end > print.skirt.len() {
                return Err(Error::SkirtRange {
                    start,
                    end,
                    count: print.skirt.len(),
                });
            }
            let mut cursor = previous_position.map(InstancePoint);
            for loop_index in start..end {
                let reference = ExtrusionEntityReference::new(&print.skirt[loop_index], false);
                let path = smooth_path.smooth(context_layer, reference, extruder_id, &mut cursor);
                if !path.is_empty() {
                    extruder_extrusions.skirt.push((loop_index, path));
                }
            }
            previous_position = cursor.map(|point| point.0);
        }

        // Brim prints entirely under the first extruder of the layer.
        if inputs.get_brim && layer_tools.extruders.first() == Some(&extruder_id) {
            let mut cursor = previous_position.map(InstancePoint);
            for entity in &print.brim {
                let reference = ExtrusionEntityReference::new(entity, false);
                let path = smooth_path.smooth(context_layer, reference, extruder_id, &mut cursor);
                if !path.is_empty() {
                    extruder_extrusions.brim.push(path);
                }
            }
            previous_position = cursor.map(|point| point.0);
        }

        // Wiping overrides claimed for this extruder, one slot per
        // instance, printed before any normally assigned work.
        if layer_tools.wiping_extrusions().is_anything_overridden() {
            for instance in inputs.instances_to_print {
                debug_assert!(instance.layer_index < inputs.layers.len());
                let Some(entry) = inputs.layers.get(instance.layer_index) else {
                    extruder_extrusions.overridden_extrusions.push(Vec::new());
                    continue;
                };
                let shift = instance.shift();
                let context = SliceContext {
                    print,
                    layer_tools,
                    smoother: smooth_path,
                    extruder_id,
                    object_index: print.object_index(instance.object).unwrap_or_default(),
                    copy_id: instance.instance_index,
                    select_overridden: true,
                };
                let mut cursor =
                    previous_position.map(|point| InstancePoint::from_print_space(point, shift));
                let slices = collect_slices_extrusions(&context, *entry, &mut cursor);
                previous_position = cursor.map(|point| point.to_print_space(shift));
                extruder_extrusions.overridden_extrusions.push(slices);
            }
        }

        // Support and object extrusions, instance by instance.
        for instance in inputs.instances_to_print {
            debug_assert!(instance.layer_index < inputs.layers.len());
            let Some(entry) = inputs.layers.get(instance.layer_index) else {
                continue;
            };
            let shift = instance.shift();
            let mut normal = NormalExtrusions::new(shift);
            let mut cursor =
                previous_position.map(|point| InstancePoint::from_print_space(point, shift));

            if let Some(support_layer) = entry.support_layer() {
                let references = select_support_references(
                    support_layer,
                    &instance.object.config,
                    layer_tools,
                    extruder_id,
                );
                if !references.is_empty() {
                    let chained =
                        chain_entity_references(references, cursor.map(|point| point.0));
                    let layer_context = entry.object_layer().unwrap_or(context_layer);
                    for reference in chained {
                        let path =
                            smooth_path.smooth(layer_context, reference, extruder_id, &mut cursor);
                        if !path.is_empty() {
                            normal.support_extrusions.push(path);
                        }
                    }
                }
            }

            let context = SliceContext {
                print,
                layer_tools,
                smoother: smooth_path,
                extruder_id,
                object_index: print.object_index(instance.object).unwrap_or_default(),
                copy_id: instance.instance_index,
                select_overridden: false,
            };
            normal.slices_extrusions = collect_slices_extrusions(&context, *entry, &mut cursor);

            previous_position = cursor.map(|point| point.to_print_space(shift));
            extruder_extrusions.normal_extrusions.push(normal);
        }

        extrusions.push(extruder_extrusions);
    }

    Ok(extrusions)
}

/// Shared state for one instance's slice collection pass.
struct SliceContext<'a, 'b> {
    print: &'a Print,
    layer_tools: &'b LayerTools,
    smoother: &'b dyn PathSmoother,
    extruder_id: u32,
    object_index: usize,
    copy_id: usize,
    /// Override pass (pick entities reassigned here) vs normal pass.
    select_overridden: bool,
}

impl SliceContext<'_, '_> {
    /// Whether a group prints in this pass under this extruder.
    fn should_print(&self, entity_id: u64, correct_extruder: u32) -> bool {
        let (assigned, is_override) = self.layer_tools.wiping_extrusions().assigned_extruder(
            self.object_index as u64,
            entity_id,
            self.copy_id,
            correct_extruder,
        );
        if self.select_overridden {
            is_override && assigned == self.extruder_id
        } else {
            !is_override && assigned == self.extruder_id
        }
    }
}

/// One [`SliceExtrusions`] per slice of the entry's object layer.
fn collect_slices_extrusions<'a>(
    context: &SliceContext<'a, '_>,
    entry: ObjectLayerToPrint<'a>,
    cursor: &mut Option<InstancePoint>,
) -> Vec<SliceExtrusions<'a>> {
    let Some(layer) = entry.object_layer() else {
        return Vec::new();
    };
    let mut slices = Vec::with_capacity(layer.slices.len());
    for slice_index in 0..layer.slices.len() {
        let common_extrusions = collect_island_extrusions(context, layer, slice_index, cursor);
        // Ironing always renders after every island of its slice and is
        // never claimed by wiping overrides.
        let ironing_extrusions = if context.select_overridden {
            Vec::new()
        } else {
            collect_ironing_extrusions(context, layer, slice_index, cursor)
        };
        slices.push(SliceExtrusions {
            common_extrusions,
            ironing_extrusions,
        });
    }
    slices
}

fn collect_island_extrusions<'a>(
    context: &SliceContext<'a, '_>,
    layer: &'a Layer,
    slice_index: usize,
    cursor: &mut Option<InstancePoint>,
) -> Vec<IslandExtrusions<'a>> {
    let mut islands = Vec::new();
    for layer_region in &layer.regions {
        let Some(region) = context.print.region(layer_region.region_id) else {
            continue;
        };
        let group_count = layer_region.perimeters.len().max(layer_region.fills.len());
        for group_index in 0..group_count {
            let perimeter_group = layer_region
                .perimeters
                .get(group_index)
                .filter(|group| !group.is_empty());
            let fill_group = layer_region
                .fills
                .get(group_index)
                .filter(|group| !group.is_empty());
            let anchor = perimeter_group
                .and_then(|group| group.first_point())
                .or_else(|| fill_group.and_then(|group| group.first_point()));
            let Some(anchor) = anchor else {
                continue;
            };
            if layer.island_index(&anchor) != Some(slice_index) {
                continue;
            }

            let mut island = IslandExtrusions::new(region);
            if let Some(group) = perimeter_group {
                let entity_id = override_entity_id(layer_region.region_id, group_index, false);
                let correct = context.layer_tools.extruder(group, region);
                if context.should_print(entity_id, correct) {
                    extrude_perimeters(context, layer, group, cursor, &mut island.perimeters);
                }
            }
            if let Some(group) = fill_group {
                let entity_id = override_entity_id(layer_region.region_id, group_index, true);
                let correct = context.layer_tools.extruder(group, region);
                if context.should_print(entity_id, correct) {
                    let items = extrude_chained(context, layer, group, cursor);
                    if !items.is_empty() {
                        island.infill_ranges.push(InfillRange { items, region });
                    }
                }
            }
            if !island.is_empty() {
                islands.push(island);
            }
        }
    }
    islands
}

fn collect_ironing_extrusions<'a>(
    context: &SliceContext<'a, '_>,
    layer: &'a Layer,
    slice_index: usize,
    cursor: &mut Option<InstancePoint>,
) -> Vec<InfillRange<'a>> {
    let mut ranges = Vec::new();
    for layer_region in &layer.regions {
        let Some(region) = context.print.region(layer_region.region_id) else {
            continue;
        };
        for group in &layer_region.ironings {
            if group.is_empty() {
                continue;
            }
            let Some(anchor) = group.first_point() else {
                continue;
            };
            if layer.island_index(&anchor) != Some(slice_index) {
                continue;
            }
            if context.layer_tools.extruder(group, region) != context.extruder_id {
                continue;
            }
            let items = extrude_chained(context, layer, group, cursor);
            if !items.is_empty() {
                ranges.push(InfillRange { items, region });
            }
        }
    }
    ranges
}

/// Order one island group's loops and smooth them in print order.
fn extrude_perimeters<'a>(
    context: &SliceContext<'a, '_>,
    layer: &Layer,
    group: &'a ExtrusionEntity,
    cursor: &mut Option<InstancePoint>,
    out: &mut Vec<Perimeter<'a>>,
) {
    let loops: &'a [ExtrusionEntity] = match group {
        ExtrusionEntity::Collection { entities, .. } => entities,
        other => std::slice::from_ref(other),
    };
    let keep_order = matches!(group, ExtrusionEntity::Collection { no_sort: true, .. });
    let ordered: Vec<OrderedLoop> = if keep_order {
        (0..loops.len())
            .map(|index| OrderedLoop {
                index,
                seam_index: 0,
                reversed: false,
            })
            .collect()
    } else {
        order_loops(loops, cursor.map(|point| point.0)).loops
    };
    for selected in ordered {
        let entity = &loops[selected.index];
        let reference = ExtrusionEntityReference::new(entity, selected.reversed);
        let path = context
            .smoother
            .smooth(layer, reference, context.extruder_id, cursor);
        if path.is_empty() {
            continue;
        }
        out.push(Perimeter {
            smooth_path: path,
            reversed: selected.reversed,
            extrusion_entity: entity,
        });
    }
}

/// Chain one group's open paths and smooth them in print order.
fn extrude_chained<'a>(
    context: &SliceContext<'a, '_>,
    layer: &Layer,
    group: &'a ExtrusionEntity,
    cursor: &mut Option<InstancePoint>,
) -> Vec<SmoothPath> {
    let children: &'a [ExtrusionEntity] = match group {
        ExtrusionEntity::Collection { entities, .. } => entities,
        other => std::slice::from_ref(other),
    };
    let keep_order = matches!(group, ExtrusionEntity::Collection { no_sort: true, .. });
    let ordered: Vec<ChainedPath> = if keep_order {
        (0..children.len())
            .map(|index| ChainedPath {
                index,
                reversed: false,
            })
            .collect()
    } else {
        chain_open_paths(children, cursor.map(|point| point.0))
    };
    let mut items = Vec::new();
    for selected in ordered {
        let reference = ExtrusionEntityReference::new(&children[selected.index], selected.reversed);
        let path = context
            .smoother
            .smooth(layer, reference, context.extruder_id, cursor);
        if !path.is_empty() {
            items.push(path);
        }
    }
    items
}

/// The support entities one extruder prints for an object.
///
/// A zero (don't care) assignment follows the first extruder of the layer,
/// so don't-care support prints exactly once, as early as possible.
fn select_support_references<'a>(
    support_layer: &'a SupportLayer,
    config: &PrintObjectConfig,
    layer_tools: &LayerTools,
    extruder_id: u32,
) -> Vec<ExtrusionEntityReference<'a>> {
    let first_layer_extruder = layer_tools.extruders.first().copied();
    let support_extruder = match config.support_material_extruder {
        0 => first_layer_extruder,
        value => Some(value - 1),
    };
    let interface_extruder = match config.support_material_interface_extruder {
        0 => first_layer_extruder,
        value => Some(value - 1),
    };
    let take_support = support_extruder == Some(extruder_id);
    let take_interface = interface_extruder == Some(extruder_id);
    if !take_support && !take_interface {
        return Vec::new();
    }
    support_layer
        .support_fills
        .iter()
        .filter(|entity| !entity.is_empty())
        .filter(|entity| {
            if matches!(entity.role(), ExtrusionRole::SupportMaterialInterface) {
                take_interface
            } else {
                take_support
            }
        })
        .map(|entity| ExtrusionEntityReference::new(entity, false))
        .collect()
}

/// Final print-space point of the last non-empty reference in a list.
/// `offset` is the instance shift of the references' owner.
pub fn get_last_position(
    extrusions: &[ExtrusionEntityReference<'_>],
    offset: Point,
) -> Option<Point> {
    extrusions
        .iter()
        .rev()
        .find_map(|reference| reference.last_point())
        .map(|point| point + offset)
}

/// First printable point of a whole per-extruder plan, print space. The
/// writer travels here before the layer starts.
pub fn get_first_point(extrusions: &[ExtruderExtrusions<'_>]) -> Option<Point> {
    for extruder_extrusions in extrusions {
        for (_, path) in &extruder_extrusions.skirt {
            if let Some(point) = path.first_point() {
                return Some(point);
            }
        }
        for path in &extruder_extrusions.brim {
            if let Some(point) = path.first_point() {
                return Some(point);
            }
        }
        for (index, slices) in extruder_extrusions.overridden_extrusions.iter().enumerate() {
            let offset = extruder_extrusions
                .normal_extrusions
                .get(index)
                .map(|normal| normal.instance_offset)
                .unwrap_or(Point::zero());
            if let Some(point) = slices_first_point(slices) {
                return Some(point + offset);
            }
        }
        for normal in &extruder_extrusions.normal_extrusions {
            for path in &normal.support_extrusions {
                if let Some(point) = path.first_point() {
                    return Some(point + normal.instance_offset);
                }
            }
            if let Some(point) = slices_first_point(&normal.slices_extrusions) {
                return Some(point + normal.instance_offset);
            }
        }
    }
    None
}

fn slices_first_point(slices: &[SliceExtrusions<'_>]) -> Option<Point> {
    for slice in slices {
        for island in &slice.common_extrusions {
            for perimeter in &island.perimeters {
                if let Some(point) = perimeter.smooth_path.first_point() {
                    return Some(point);
                }
            }
            for range in &island.infill_ranges {
                for path in &range.items {
                    if let Some(point) = path.first_point() {
                        return Some(point);
                    }
                }
            }
        }
        for range in &slice.ironing_extrusions {
            for path in &range.items {
                if let Some(point) = path.first_point() {
                    return Some(point);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::ExtrusionAttributes;
    use crate::gcode::smooth_path::SmoothPathElement;
    use crate::print::SupportLayer;

    fn make_layer(id: usize, print_z: f64) -> Layer {
        Layer::new(id, print_z)
    }

    fn make_support_layer(id: usize, print_z: f64) -> SupportLayer {
        SupportLayer::new(id, print_z)
    }

    fn make_line_path(points: Vec<Point>) -> SmoothPath {
        SmoothPath {
            elements: vec![SmoothPathElement::Line {
                attributes: ExtrusionAttributes::new(ExtrusionRole::Perimeter),
                points,
            }],
        }
    }

    #[test]
    fn test_instance_point_round_trip() {
        let shift = Point::new_scale(30.0, -10.0);
        let print_space = Point::new_scale(35.0, 5.0);
        let local = InstancePoint::from_print_space(print_space, shift);
        assert_eq!(local.0, Point::new_scale(5.0, 15.0));
        assert_eq!(local.to_print_space(shift), print_space);
    }

    #[test]
    fn test_collate_pairs_within_epsilon() {
        let mut object = PrintObject::new("cube");
        object.layers.push(make_layer(0, 0.2));
        object.layers.push(make_layer(1, 0.4));
        object.support_layers.push(make_support_layer(0, 0.4));
        object.support_layers.push(make_support_layer(1, 0.6));

        let collated = collate_layers_to_print(&object);
        assert_eq!(collated.len(), 3);

        assert!(collated[0].object_layer().is_some());
        assert!(collated[0].support_layer().is_none());
        assert!((collated[0].print_z() - 0.2).abs() < 1e-9);

        assert!(collated[1].object_layer().is_some());
        assert!(collated[1].support_layer().is_some());
        assert!((collated[1].print_z() - 0.4).abs() < 1e-9);

        assert!(collated[2].object_layer().is_none());
        assert!(collated[2].support_layer().is_some());
        assert!((collated[2].print_z() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_collate_averages_print_z() {
        let mut object = PrintObject::new("cube");
        object.layers.push(make_layer(0, 0.4));
        object.support_layers.push(make_support_layer(0, 0.4 + 4e-5));

        let collated = collate_layers_to_print(&object);
        assert_eq!(collated.len(), 1);
        assert!((collated[0].print_z() - (0.4 + 2e-5)).abs() < 1e-9);
        assert!((collated[0].layer().print_z() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_collate_support_only_layer_anchor() {
        let mut object = PrintObject::new("cube");
        object.support_layers.push(make_support_layer(3, 0.8));

        let collated = collate_layers_to_print(&object);
        assert_eq!(collated.len(), 1);
        match collated[0].layer() {
            LayerRef::Support(layer) => assert_eq!(layer.id, 3),
            LayerRef::Object(_) => panic!("expected the support layer"),
        }
    }

    #[test]
    fn test_instances_to_print_stable_order() {
        let mut object = PrintObject::new("cube");
        object.add_instance(Point::new_scale(50.0, 0.0));
        object.layers.push(make_layer(0, 0.2));
        let collated = collate_layers_to_print(&object);

        let instances = instances_to_print(&collated);
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].layer_index, 0);
        assert_eq!(instances[0].instance_index, 0);
        assert_eq!(instances[0].shift(), Point::zero());
        assert_eq!(instances[1].instance_index, 1);
        assert_eq!(instances[1].shift(), Point::new_scale(50.0, 0.0));
    }

    #[test]
    fn test_get_last_position_shifts_into_print_space() {
        let path = ExtrusionEntity::Path(crate::extrusion::ExtrusionPath::new(
            crate::geometry::Polyline::from_points(vec![
                Point::new_scale(0.0, 0.0),
                Point::new_scale(10.0, 0.0),
            ]),
            ExtrusionAttributes::new(ExtrusionRole::SupportMaterial),
        ));
        let references = vec![ExtrusionEntityReference::new(&path, false)];
        let offset = Point::new_scale(100.0, 0.0);

        assert_eq!(
            get_last_position(&references, offset),
            Some(Point::new_scale(110.0, 0.0))
        );

        let flipped = vec![ExtrusionEntityReference::new(&path, true)];
        assert_eq!(
            get_last_position(&flipped, offset),
            Some(Point::new_scale(100.0, 0.0))
        );

        assert_eq!(get_last_position(&[], offset), None);
    }

    #[test]
    fn test_get_first_point_prefers_skirt() {
        let mut entry = ExtruderExtrusions::new(0);
        assert_eq!(get_first_point(std::slice::from_ref(&entry)), None);

        let mut normal = NormalExtrusions::new(Point::new_scale(50.0, 0.0));
        normal
            .support_extrusions
            .push(make_line_path(vec![Point::zero(), Point::new_scale(1.0, 0.0)]));
        entry.normal_extrusions.push(normal);
        assert_eq!(
            get_first_point(std::slice::from_ref(&entry)),
            Some(Point::new_scale(50.0, 0.0))
        );

        entry.skirt.push((
            0,
            make_line_path(vec![Point::new_scale(-5.0, -5.0), Point::new_scale(5.0, -5.0)]),
        ));
        assert_eq!(
            get_first_point(std::slice::from_ref(&entry)),
            Some(Point::new_scale(-5.0, -5.0))
        );
    }
}
