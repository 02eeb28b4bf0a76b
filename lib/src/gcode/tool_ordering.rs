//! Tool ordering for multi-extruder prints.
//!
//! # Overview
//!
//! Before extrusions can be ordered within a print z, the printer needs to
//! know which extruders participate at that z and in what sequence. This
//! module builds one [`LayerTools`] entry per print z from the print model:
//! it collects the extruders each region and support layer demands, resolves
//! "don't care" assignments, and rotates each layer's sequence so it opens
//! with the extruder the previous layer ended on, avoiding a pointless tool
//! change at the layer boundary.
//!
//! [`WipingExtrusions`] is the per-layer override table filled by the wipe
//! tower planner: selected entities are reassigned to another extruder so
//! their extrusion doubles as a nozzle wipe after a tool change.
//!
//! # Reference
//!
//! - `src/libslic3r/GCode/ToolOrdering.hpp`
//! - `src/libslic3r/GCode/ToolOrdering.cpp`

use std::collections::HashMap;

use crate::extrusion::ExtrusionEntity;
use crate::print::{Print, PrintRegion};
use crate::EPSILON;

/// Override-table key of one first-level entity group of a layer.
///
/// Groups are addressed by their region id and their index within the
/// region's per-island vectors; fill groups are flagged apart from
/// perimeter groups. Markers and queries must use the same scheme.
pub fn override_entity_id(region_id: usize, group_index: usize, is_fill: bool) -> u64 {
    let kind = if is_fill { 1u64 << 63 } else { 0 };
    kind | ((region_id as u64) << 32) | group_index as u64
}

/// Tracks extrusions reassigned to another extruder to absorb a wipe.
///
/// Each overridable entity maps to a per-copy vector. An entry holds either
/// the wiping extruder (`>= 0`, print during that extruder's override pass)
/// or the encoding `-correct_extruder - 1` ("not reassigned, print normally
/// under the correct extruder"). Untouched entries start at `-1`, which is
/// the same encoding with correct extruder 0.
#[derive(Debug, Clone, Default)]
pub struct WipingExtrusions {
    /// (object id, entity id) -> override per instance copy.
    entity_overrides: HashMap<(u64, u64), Vec<i32>>,
    /// Whether any extrusion has been reassigned.
    something_overridden: bool,
}

impl WipingExtrusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any extrusion has been reassigned.
    pub fn is_anything_overridden(&self) -> bool {
        self.something_overridden
    }

    /// Reassign one copy of an entity to the given extruder.
    pub fn set_extruder_override(
        &mut self,
        object_id: u64,
        entity_id: u64,
        copy_id: usize,
        extruder: u32,
        num_copies: usize,
    ) {
        self.something_overridden = true;
        let overrides = self
            .entity_overrides
            .entry((object_id, entity_id))
            .or_insert_with(|| vec![-1; num_copies]);
        if overrides.len() < num_copies {
            overrides.resize(num_copies, -1);
        }
        if copy_id < overrides.len() {
            overrides[copy_id] = extruder as i32;
        }
    }

    /// Check if a copy of an entity has been reassigned.
    pub fn is_entity_overridden(&self, object_id: u64, entity_id: u64, copy_id: usize) -> bool {
        self.entity_overrides
            .get(&(object_id, entity_id))
            .and_then(|overrides| overrides.get(copy_id))
            .map(|&value| value >= 0)
            .unwrap_or(false)
    }

    /// The extruder a copy of an entity was reassigned to, if any.
    pub fn overridden_extruder(
        &self,
        object_id: u64,
        entity_id: u64,
        copy_id: usize,
    ) -> Option<u32> {
        self.entity_overrides
            .get(&(object_id, entity_id))
            .and_then(|overrides| overrides.get(copy_id))
            .and_then(|&value| (value >= 0).then_some(value as u32))
    }

    /// The extruder that must print a copy of an entity, with `true` when
    /// that is a wiping reassignment rather than the region's own choice.
    pub fn assigned_extruder(
        &self,
        object_id: u64,
        entity_id: u64,
        copy_id: usize,
        correct_extruder: u32,
    ) -> (u32, bool) {
        match self.overridden_extruder(object_id, entity_id, copy_id) {
            Some(extruder) => (extruder, true),
            None => (correct_extruder, false),
        }
    }

    /// Clear all overrides.
    pub fn clear(&mut self) {
        self.entity_overrides.clear();
        self.something_overridden = false;
    }
}

/// Per-print-z information about extruders and tool changes.
#[derive(Debug, Clone)]
pub struct LayerTools {
    /// Print z of this layer in mm.
    pub print_z: f64,

    /// Whether this layer has object extrusions.
    pub has_object: bool,

    /// Whether this layer has support extrusions.
    pub has_support: bool,

    /// Zero-based extruder ids in print order for this layer.
    pub extruders: Vec<u32>,

    /// Whether a skirt is printed at this layer.
    pub has_skirt: bool,

    /// Whether the wipe tower is active at this layer.
    pub has_wipe_tower: bool,

    /// Wiping overrides for this layer.
    wiping_extrusions: WipingExtrusions,
}

impl LayerTools {
    /// Create layer tools for a given print z.
    pub fn new(print_z: f64) -> Self {
        Self {
            print_z,
            has_object: false,
            has_support: false,
            extruders: Vec::new(),
            has_skirt: false,
            has_wipe_tower: false,
            wiping_extrusions: WipingExtrusions::new(),
        }
    }

    /// Check if extruder `a` prints before extruder `b` on this layer.
    pub fn is_extruder_order(&self, a: u32, b: u32) -> bool {
        if a == b {
            return false;
        }
        for &extruder in &self.extruders {
            if extruder == a {
                return true;
            }
            if extruder == b {
                return false;
            }
        }
        false
    }

    /// Check if this layer uses a specific extruder.
    pub fn has_extruder(&self, extruder: u32) -> bool {
        self.extruders.contains(&extruder)
    }

    /// Whether the given extruder closes this layer, i.e. every other
    /// extruder of the layer prints before it.
    pub fn all_extruders_done_before(&self, extruder: u32) -> bool {
        match self.extruders.iter().position(|&e| e == extruder) {
            Some(position) => position + 1 == self.extruders.len(),
            None => false,
        }
    }

    /// Resolve the 0-based extruder printing an entity of a region.
    ///
    /// Perimeter roles follow the region's perimeter assignment, infill
    /// roles the sparse or solid infill assignment. A `0` (follow current)
    /// assignment resolves to the first extruder of this layer.
    pub fn extruder(&self, entity: &ExtrusionEntity, region: &PrintRegion) -> u32 {
        let assigned = region.config.extruder_for(entity.role());
        let resolved = if assigned == 0 {
            self.extruders.first().copied().unwrap_or(0)
        } else {
            assigned - 1
        };
        debug_assert!(
            self.extruders.is_empty() || self.has_extruder(resolved),
            "extruder {} is not scheduled at print_z {}",
            resolved,
            self.print_z
        );
        resolved
    }

    /// Wiping override table for this layer.
    pub fn wiping_extrusions(&self) -> &WipingExtrusions {
        &self.wiping_extrusions
    }

    /// Mutable wiping override table for this layer.
    pub fn wiping_extrusions_mut(&mut self) -> &mut WipingExtrusions {
        &mut self.wiping_extrusions
    }
}

impl PartialEq for LayerTools {
    fn eq(&self, other: &Self) -> bool {
        (self.print_z - other.print_z).abs() < EPSILON
    }
}

impl PartialOrd for LayerTools {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.print_z.partial_cmp(&other.print_z)
    }
}

/// Builds the per-print-z [`LayerTools`] tables for a print.
#[derive(Debug, Clone, Default)]
pub struct ToolOrdering {
    /// Per-layer tool information in ascending print z.
    layer_tools: Vec<LayerTools>,
    /// First printing extruder (0-based).
    first_printing_extruder: Option<u32>,
    /// Last printing extruder (0-based).
    last_printing_extruder: Option<u32>,
    /// All extruders used in the print (0-based, ascending).
    all_printing_extruders: Vec<u32>,
}

impl ToolOrdering {
    /// Build the tool ordering for a whole print.
    pub fn new(print: &Print) -> Self {
        let mut ordering = Self::default();
        ordering.initialize_layers(print);
        ordering.collect_extruders(print);
        ordering.handle_dontcare_extruders();
        ordering.mark_skirt_and_wipe_tower(print);
        ordering.collect_extruder_statistics();
        ordering
    }

    /// Collect the distinct print z values of every object and support
    /// layer, merging values within epsilon into one entry.
    fn initialize_layers(&mut self, print: &Print) {
        let mut z_heights: Vec<f64> = Vec::new();
        for object in &print.objects {
            z_heights.extend(object.layers.iter().map(|layer| layer.print_z));
            z_heights.extend(object.support_layers.iter().map(|layer| layer.print_z));
        }
        z_heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        self.layer_tools.clear();
        let mut i = 0;
        while i < z_heights.len() {
            let z_max = z_heights[i] + EPSILON;
            let mut j = i + 1;
            while j < z_heights.len() && z_heights[j] <= z_max {
                j += 1;
            }
            self.layer_tools.push(LayerTools::new(z_heights[i]));
            i = j;
        }
    }

    /// Collect the raw 1-based extruder demands of every layer. `0` entries
    /// mean "don't care" and are resolved afterwards.
    fn collect_extruders(&mut self, print: &Print) {
        for object in &print.objects {
            for layer in &object.layers {
                let mut extruders: Vec<u32> = Vec::new();
                for layer_region in &layer.regions {
                    let Some(region) = print.region(layer_region.region_id) else {
                        continue;
                    };
                    if !layer_region.perimeters.is_empty() {
                        extruders.push(region.config.perimeter_extruder);
                    }
                    let mut has_sparse = false;
                    let mut has_solid = false;
                    for fill in &layer_region.fills {
                        if fill.is_empty() {
                            continue;
                        }
                        if fill.role().is_solid_infill() {
                            has_solid = true;
                        } else {
                            has_sparse = true;
                        }
                    }
                    // Ironing follows the solid infill assignment.
                    if !layer_region.ironings.is_empty() {
                        has_solid = true;
                    }
                    if has_sparse {
                        extruders.push(region.config.infill_extruder);
                    }
                    if has_solid {
                        extruders.push(region.config.solid_infill_extruder);
                    }
                }
                if extruders.is_empty() {
                    continue;
                }
                if let Some(tools) = self.tools_for_layer_mut(layer.print_z) {
                    tools.has_object = true;
                    for extruder in extruders {
                        if !tools.extruders.contains(&extruder) {
                            tools.extruders.push(extruder);
                        }
                    }
                }
            }
            for support_layer in &object.support_layers {
                if support_layer.is_empty() {
                    continue;
                }
                if let Some(tools) = self.tools_for_layer_mut(support_layer.print_z) {
                    tools.has_support = true;
                    for extruder in [
                        object.config.support_material_extruder,
                        object.config.support_material_interface_extruder,
                    ] {
                        if !tools.extruders.contains(&extruder) {
                            tools.extruders.push(extruder);
                        }
                    }
                }
            }
        }
    }

    /// Resolve "don't care" (zero) assignments and rotate each layer so it
    /// starts with the extruder the previous layer ended on. Converts the
    /// collected 1-based values to 0-based ids.
    fn handle_dontcare_extruders(&mut self) {
        let seed = self
            .layer_tools
            .iter()
            .flat_map(|tools| tools.extruders.iter())
            .find(|&&extruder| extruder > 0)
            .copied();

        // A print where everything is "don't care" runs on the first
        // extruder.
        let mut last_extruder = seed.unwrap_or(1);

        for tools in &mut self.layer_tools {
            if tools.extruders.is_empty() {
                continue;
            }
            if tools.extruders.len() == 1 && tools.extruders[0] == 0 {
                tools.extruders[0] = last_extruder;
            } else {
                tools.extruders.retain(|&extruder| extruder != 0);
                if let Some(position) = tools
                    .extruders
                    .iter()
                    .position(|&extruder| extruder == last_extruder)
                {
                    if position > 0 {
                        let extruder = tools.extruders.remove(position);
                        tools.extruders.insert(0, extruder);
                    }
                }
            }
            if let Some(&extruder) = tools.extruders.last() {
                last_extruder = extruder;
            }
        }

        for tools in &mut self.layer_tools {
            for extruder in &mut tools.extruders {
                debug_assert!(*extruder > 0);
                *extruder = extruder.saturating_sub(1);
            }
        }
    }

    fn mark_skirt_and_wipe_tower(&mut self, print: &Print) {
        let has_skirt = print.has_skirt();
        let skirt_height = print.config.skirt_height as usize;
        let has_wipe_tower = print.config.has_wipe_tower;
        for (index, tools) in self.layer_tools.iter_mut().enumerate() {
            tools.has_skirt = has_skirt && index < skirt_height;
            tools.has_wipe_tower = has_wipe_tower;
        }
    }

    fn collect_extruder_statistics(&mut self) {
        self.first_printing_extruder = self
            .layer_tools
            .iter()
            .find_map(|tools| tools.extruders.first().copied());
        self.last_printing_extruder = self
            .layer_tools
            .iter()
            .rev()
            .find_map(|tools| tools.extruders.last().copied());

        let mut all: Vec<u32> = Vec::new();
        for tools in &self.layer_tools {
            for &extruder in &tools.extruders {
                if !all.contains(&extruder) {
                    all.push(extruder);
                }
            }
        }
        all.sort_unstable();
        self.all_printing_extruders = all;
    }

    /// Find the layer tools at a given print z, within epsilon.
    pub fn tools_for_layer(&self, print_z: f64) -> Option<&LayerTools> {
        self.layer_tools
            .iter()
            .find(|tools| (tools.print_z - print_z).abs() < EPSILON)
    }

    /// Find the layer tools at a given print z, within epsilon (mutable).
    pub fn tools_for_layer_mut(&mut self, print_z: f64) -> Option<&mut LayerTools> {
        self.layer_tools
            .iter_mut()
            .find(|tools| (tools.print_z - print_z).abs() < EPSILON)
    }

    /// The first printing extruder of the whole print.
    pub fn first_extruder(&self) -> Option<u32> {
        self.first_printing_extruder
    }

    /// The last printing extruder of the whole print.
    pub fn last_extruder(&self) -> Option<u32> {
        self.last_printing_extruder
    }

    /// All extruders used anywhere in the print, ascending.
    pub fn all_extruders(&self) -> &[u32] {
        &self.all_printing_extruders
    }

    /// All layer tools in ascending print z.
    pub fn layer_tools(&self) -> &[LayerTools] {
        &self.layer_tools
    }

    /// Mutable layer tools, for override table population.
    pub fn layer_tools_mut(&mut self) -> &mut Vec<LayerTools> {
        &mut self.layer_tools
    }

    /// Number of distinct print z values.
    pub fn len(&self) -> usize {
        self.layer_tools.len()
    }

    /// Check if the print has no layers.
    pub fn is_empty(&self) -> bool {
        self.layer_tools.is_empty()
    }

    /// Iterate the layer tools in ascending print z.
    pub fn iter(&self) -> impl Iterator<Item = &LayerTools> {
        self.layer_tools.iter()
    }
}

impl<'a> IntoIterator for &'a ToolOrdering {
    type Item = &'a LayerTools;
    type IntoIter = std::slice::Iter<'a, LayerTools>;

    fn into_iter(self) -> Self::IntoIter {
        self.layer_tools.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrusion::{ExtrusionAttributes, ExtrusionLoop, ExtrusionPath, ExtrusionRole};
    use crate::geometry::{Point, Polygon, Polyline};
    use crate::print::{Layer, LayerRegion, PrintObject, PrintRegionConfig, SupportLayer};

    fn make_perimeter_entity() -> ExtrusionEntity {
        ExtrusionEntity::collection(vec![ExtrusionEntity::Loop(ExtrusionLoop::new(
            Polygon::square(Point::new_scale(5.0, 5.0), crate::scale(5.0)),
            ExtrusionAttributes::new(ExtrusionRole::Perimeter),
        ))])
    }

    fn make_fill_entity(role: ExtrusionRole) -> ExtrusionEntity {
        ExtrusionEntity::collection(vec![ExtrusionEntity::Path(ExtrusionPath::new(
            Polyline::from_points(vec![
                Point::new_scale(1.0, 1.0),
                Point::new_scale(9.0, 1.0),
            ]),
            ExtrusionAttributes::new(role),
        ))])
    }

    fn make_layer_with_region(id: usize, print_z: f64, region_id: usize) -> Layer {
        let mut layer = Layer::new(id, print_z);
        let mut region = LayerRegion::new(region_id);
        region.perimeters.push(make_perimeter_entity());
        region
            .fills
            .push(make_fill_entity(ExtrusionRole::InternalInfill));
        layer.add_region(region);
        layer
    }

    fn make_two_extruder_print() -> Print {
        let mut print = Print::new();
        print.add_region(crate::print::PrintRegion::with_config(
            0,
            PrintRegionConfig::new()
                .with_perimeter_extruder(1)
                .with_infill_extruder(1)
                .with_solid_infill_extruder(1),
        ));
        print.add_region(crate::print::PrintRegion::with_config(
            1,
            PrintRegionConfig::new()
                .with_perimeter_extruder(2)
                .with_infill_extruder(2)
                .with_solid_infill_extruder(2),
        ));

        let mut object = PrintObject::new("cube");
        for id in 0..3 {
            let print_z = 0.2 * (id + 1) as f64;
            let mut layer = make_layer_with_region(id, print_z, 0);
            let mut second = LayerRegion::new(1);
            second.perimeters.push(make_perimeter_entity());
            layer.add_region(second);
            object.layers.push(layer);
        }
        print.add_object(object);
        print
    }

    #[test]
    fn test_layer_tools_order_queries() {
        let mut tools = LayerTools::new(0.2);
        tools.extruders = vec![2, 0, 1];

        assert!(tools.is_extruder_order(2, 0));
        assert!(tools.is_extruder_order(0, 1));
        assert!(!tools.is_extruder_order(1, 2));
        assert!(!tools.is_extruder_order(1, 1));

        assert!(tools.has_extruder(0));
        assert!(!tools.has_extruder(3));

        assert!(tools.all_extruders_done_before(1));
        assert!(!tools.all_extruders_done_before(2));
        assert!(!tools.all_extruders_done_before(7));
    }

    #[test]
    fn test_layer_tools_extruder_role_dispatch() {
        let mut tools = LayerTools::new(0.2);
        tools.extruders = vec![0, 1, 2];
        let region = crate::print::PrintRegion::with_config(
            0,
            PrintRegionConfig::new()
                .with_perimeter_extruder(1)
                .with_infill_extruder(2)
                .with_solid_infill_extruder(3),
        );

        let perimeter = make_perimeter_entity();
        let sparse = make_fill_entity(ExtrusionRole::InternalInfill);
        let solid = make_fill_entity(ExtrusionRole::SolidInfill);

        assert_eq!(tools.extruder(&perimeter, &region), 0);
        assert_eq!(tools.extruder(&sparse, &region), 1);
        assert_eq!(tools.extruder(&solid, &region), 2);
    }

    #[test]
    fn test_layer_tools_extruder_zero_follows_first() {
        let mut tools = LayerTools::new(0.2);
        tools.extruders = vec![1, 0];
        let region = crate::print::PrintRegion::with_config(
            0,
            PrintRegionConfig::new().with_perimeter_extruder(0),
        );
        let perimeter = make_perimeter_entity();
        assert_eq!(tools.extruder(&perimeter, &region), 1);
    }

    #[test]
    fn test_tool_ordering_single_extruder() {
        let mut print = Print::new();
        print.add_region(crate::print::PrintRegion::new(0));
        let mut object = PrintObject::new("cube");
        for id in 0..3 {
            object
                .layers
                .push(make_layer_with_region(id, 0.2 * (id + 1) as f64, 0));
        }
        print.add_object(object);

        let ordering = ToolOrdering::new(&print);
        assert_eq!(ordering.len(), 3);
        assert_eq!(ordering.first_extruder(), Some(0));
        assert_eq!(ordering.last_extruder(), Some(0));
        assert_eq!(ordering.all_extruders(), &[0]);
        for tools in &ordering {
            assert_eq!(tools.extruders, vec![0]);
            assert!(tools.has_object);
            assert!(!tools.has_support);
        }
    }

    #[test]
    fn test_tool_ordering_starts_layer_with_previous_extruder() {
        let ordering = ToolOrdering::new(&make_two_extruder_print());
        assert_eq!(ordering.len(), 3);

        // First layer prints 0 then 1; the next layer must open with 1.
        assert_eq!(ordering.layer_tools()[0].extruders, vec![0, 1]);
        assert_eq!(ordering.layer_tools()[1].extruders, vec![1, 0]);
        assert_eq!(ordering.layer_tools()[2].extruders, vec![0, 1]);
    }

    #[test]
    fn test_tool_ordering_merges_close_z() {
        let mut print = Print::new();
        print.add_region(crate::print::PrintRegion::new(0));
        let mut a = PrintObject::new("a");
        a.layers.push(make_layer_with_region(0, 0.2, 0));
        let mut b = PrintObject::new("b");
        b.layers.push(make_layer_with_region(0, 0.2 + 1e-5, 0));
        print.add_object(a);
        print.add_object(b);

        let ordering = ToolOrdering::new(&print);
        assert_eq!(ordering.len(), 1);
    }

    #[test]
    fn test_tool_ordering_support_dontcare_follows_current() {
        let mut print = Print::new();
        print.add_region(crate::print::PrintRegion::with_config(
            0,
            PrintRegionConfig::new()
                .with_perimeter_extruder(2)
                .with_infill_extruder(2)
                .with_solid_infill_extruder(2),
        ));
        let mut object = PrintObject::new("supported");
        object.config.support_material_extruder = 0;
        object.config.support_material_interface_extruder = 0;
        object.layers.push(make_layer_with_region(0, 0.2, 0));
        let mut support = SupportLayer::new(0, 0.2);
        support
            .support_fills
            .push(make_fill_entity(ExtrusionRole::SupportMaterial));
        object.support_layers.push(support);
        print.add_object(object);

        let ordering = ToolOrdering::new(&print);
        assert_eq!(ordering.len(), 1);
        // The don't-care support demand folds into the object extruder.
        assert_eq!(ordering.layer_tools()[0].extruders, vec![1]);
        assert!(ordering.layer_tools()[0].has_support);
    }

    #[test]
    fn test_tool_ordering_marks_skirt_layers() {
        let mut print = make_two_extruder_print();
        print.config.skirt_height = 2;
        print.skirt.push(ExtrusionEntity::Loop(ExtrusionLoop::new(
            Polygon::square(Point::new_scale(15.0, 15.0), crate::scale(15.0)),
            ExtrusionAttributes::new(ExtrusionRole::Skirt),
        )));

        let ordering = ToolOrdering::new(&print);
        assert!(ordering.layer_tools()[0].has_skirt);
        assert!(ordering.layer_tools()[1].has_skirt);
        assert!(!ordering.layer_tools()[2].has_skirt);
    }

    #[test]
    fn test_tools_for_layer_lookup() {
        let ordering = ToolOrdering::new(&make_two_extruder_print());
        assert!(ordering.tools_for_layer(0.4).is_some());
        assert!(ordering.tools_for_layer(0.4 + 1e-5).is_some());
        assert!(ordering.tools_for_layer(0.55).is_none());
    }

    #[test]
    fn test_wiping_extrusions_overrides() {
        let mut wiping = WipingExtrusions::new();
        assert!(!wiping.is_anything_overridden());

        wiping.set_extruder_override(0, 7, 1, 2, 3);
        assert!(wiping.is_anything_overridden());
        assert!(wiping.is_entity_overridden(0, 7, 1));
        assert!(!wiping.is_entity_overridden(0, 7, 0));
        assert_eq!(wiping.overridden_extruder(0, 7, 1), Some(2));
        assert_eq!(wiping.overridden_extruder(0, 7, 0), None);

        // Copy 1 prints under extruder 2 as a wipe, copy 0 stays with its
        // region's extruder.
        assert_eq!(wiping.assigned_extruder(0, 7, 1, 0), (2, true));
        assert_eq!(wiping.assigned_extruder(0, 7, 0, 0), (0, false));
        assert_eq!(wiping.assigned_extruder(0, 99, 0, 1), (1, false));

        wiping.clear();
        assert!(!wiping.is_anything_overridden());
        assert!(!wiping.is_entity_overridden(0, 7, 1));
    }

    #[test]
    fn test_override_entity_ids_distinct() {
        let perimeter = override_entity_id(1, 2, false);
        let fill = override_entity_id(1, 2, true);
        let other_region = override_entity_id(2, 2, false);
        let other_group = override_entity_id(1, 3, false);
        assert_ne!(perimeter, fill);
        assert_ne!(perimeter, other_region);
        assert_ne!(perimeter, other_group);
    }

    #[test]
    fn test_layer_tools_epsilon_equality() {
        let a = LayerTools::new(0.2);
        let b = LayerTools::new(0.2 + 1e-5);
        let c = LayerTools::new(0.4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }
}
