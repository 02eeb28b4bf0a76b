//! Print model: the sliced input the ordering core consumes.
//!
//! This module provides the high-level print job types:
//! - [`Print`] - the whole job: objects, regions, skirt/brim, global config
//! - [`PrintObject`] - one object with its layers, supports, and instances
//! - [`PrintInstance`] - one printed copy of an object (per-copy shift)
//! - [`PrintRegion`] - per-region settings, notably extruder assignment
//!
//! All geometry is owned here; the ordering core only borrows it.

pub mod layer;

pub use layer::{Layer, LayerRegion, Layers, SupportLayer};

use crate::extrusion::{ExtrusionEntity, ExtrusionRole};
use crate::geometry::Point;
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Global print configuration relevant to extrusion ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintConfig {
    /// Whether a wipe tower is printed for multi-material tool changes.
    pub has_wipe_tower: bool,

    /// Number of layers the skirt extends upward from the bed.
    pub skirt_height: u32,

    /// Brim width in mm (0 disables the brim).
    pub brim_width: CoordF,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            has_wipe_tower: false,
            skirt_height: 1,
            brim_width: 0.0,
        }
    }
}

impl PrintConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set wipe tower presence.
    pub fn with_wipe_tower(mut self, has_wipe_tower: bool) -> Self {
        self.has_wipe_tower = has_wipe_tower;
        self
    }

    /// Set the skirt height in layers.
    pub fn with_skirt_height(mut self, skirt_height: u32) -> Self {
        self.skirt_height = skirt_height;
        self
    }

    /// Set the brim width in mm.
    pub fn with_brim_width(mut self, brim_width: CoordF) -> Self {
        self.brim_width = brim_width;
        self
    }
}

/// Per-object configuration relevant to extrusion ordering.
///
/// Extruder assignments are 1-based; `0` means "don't care, print with
/// whatever extruder is active".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintObjectConfig {
    /// Extruder printing the support body (1-based, 0 = don't care).
    pub support_material_extruder: u32,

    /// Extruder printing dense support interfaces (1-based, 0 = don't care).
    pub support_material_interface_extruder: u32,
}

impl Default for PrintObjectConfig {
    fn default() -> Self {
        Self {
            support_material_extruder: 1,
            support_material_interface_extruder: 1,
        }
    }
}

impl PrintObjectConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the support body extruder (1-based, 0 = don't care).
    pub fn with_support_extruder(mut self, extruder: u32) -> Self {
        self.support_material_extruder = extruder;
        self
    }

    /// Set the support interface extruder (1-based, 0 = don't care).
    pub fn with_support_interface_extruder(mut self, extruder: u32) -> Self {
        self.support_material_interface_extruder = extruder;
        self
    }
}

/// Per-region configuration relevant to extrusion ordering.
///
/// Extruder assignments are 1-based; `0` means "follow the currently active
/// extruder".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRegionConfig {
    /// Extruder printing perimeters (1-based, 0 = follow current).
    pub perimeter_extruder: u32,

    /// Extruder printing sparse infill (1-based, 0 = follow current).
    pub infill_extruder: u32,

    /// Extruder printing solid infill (1-based, 0 = follow current).
    pub solid_infill_extruder: u32,
}

impl Default for PrintRegionConfig {
    fn default() -> Self {
        Self {
            perimeter_extruder: 1,
            infill_extruder: 1,
            solid_infill_extruder: 1,
        }
    }
}

impl PrintRegionConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the perimeter extruder (1-based).
    pub fn with_perimeter_extruder(mut self, extruder: u32) -> Self {
        self.perimeter_extruder = extruder;
        self
    }

    /// Set the sparse infill extruder (1-based).
    pub fn with_infill_extruder(mut self, extruder: u32) -> Self {
        self.infill_extruder = extruder;
        self
    }

    /// Set the solid infill extruder (1-based).
    pub fn with_solid_infill_extruder(mut self, extruder: u32) -> Self {
        self.solid_infill_extruder = extruder;
        self
    }

    /// The raw 1-based extruder assignment for a role (0 = follow current).
    /// Ironing dispatches with the solid infill extruder.
    pub fn extruder_for(&self, role: ExtrusionRole) -> u32 {
        if role.is_infill() {
            if role.is_solid_infill() || role.is_ironing() {
                self.solid_infill_extruder
            } else {
                self.infill_extruder
            }
        } else {
            self.perimeter_extruder
        }
    }
}

/// One print region: a section of the print sharing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintRegion {
    /// Region index, matching `LayerRegion::region_id`.
    pub id: usize,

    /// Region settings.
    pub config: PrintRegionConfig,
}

impl PrintRegion {
    /// Create a region with default settings.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            config: PrintRegionConfig::default(),
        }
    }

    /// Create a region with the given settings.
    pub fn with_config(id: usize, config: PrintRegionConfig) -> Self {
        Self { id, config }
    }

    /// Resolve the 0-based extruder for a role. A `0` (follow current)
    /// assignment resolves to extruder 0.
    pub fn extruder(&self, role: ExtrusionRole) -> u32 {
        let extruder = self.config.extruder_for(role);
        extruder.saturating_sub(1)
    }
}

/// One printed copy of an object: the shift from instance space into print
/// (bed) space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintInstance {
    /// Translation applied to the object's geometry for this copy.
    pub shift: Point,
}

impl PrintInstance {
    /// Create an instance at the given shift.
    pub fn new(shift: Point) -> Self {
        Self { shift }
    }
}

/// Represents a single object to be printed.
#[derive(Debug, Clone, Default)]
pub struct PrintObject {
    /// Object name/identifier.
    pub name: String,

    /// Sliced object layers in ascending print z.
    pub layers: Vec<Layer>,

    /// Generated support layers in ascending print z.
    pub support_layers: Vec<SupportLayer>,

    /// Printed copies of this object. Always at least one.
    pub instances: Vec<PrintInstance>,

    /// Per-object settings.
    pub config: PrintObjectConfig,
}

impl PrintObject {
    /// Create a new print object with a single instance at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layers: Vec::new(),
            support_layers: Vec::new(),
            instances: vec![PrintInstance::default()],
            config: PrintObjectConfig::default(),
        }
    }

    /// Replace the instance list.
    pub fn set_instances(&mut self, instances: Vec<PrintInstance>) {
        self.instances = instances;
    }

    /// Add a printed copy at the given shift.
    pub fn add_instance(&mut self, shift: Point) {
        self.instances.push(PrintInstance::new(shift));
    }

    /// Check if this object has been sliced.
    pub fn is_sliced(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Check if this object carries generated supports.
    pub fn has_support(&self) -> bool {
        !self.support_layers.is_empty()
    }
}

/// Represents an entire print job.
#[derive(Debug, Clone, Default)]
pub struct Print {
    /// Objects to be printed.
    pub objects: Vec<PrintObject>,

    /// Print regions referenced by `LayerRegion::region_id`.
    pub regions: Vec<PrintRegion>,

    /// Skirt loop entities, outermost first.
    pub skirt: Vec<ExtrusionEntity>,

    /// Brim entities attached to the first layer.
    pub brim: Vec<ExtrusionEntity>,

    /// Global settings.
    pub config: PrintConfig,
}

impl Print {
    /// Create a new empty print job.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the print job.
    pub fn add_object(&mut self, object: PrintObject) {
        self.objects.push(object);
    }

    /// Add a region definition.
    pub fn add_region(&mut self, region: PrintRegion) {
        self.regions.push(region);
    }

    /// Get a region by id.
    pub fn region(&self, id: usize) -> Option<&PrintRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Position of a borrowed object within this print.
    pub fn object_index(&self, object: &PrintObject) -> Option<usize> {
        self.objects
            .iter()
            .position(|candidate| std::ptr::eq(candidate, object))
    }

    /// Get the number of objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Check if the print job is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether a wipe tower participates in this print.
    pub fn has_wipe_tower(&self) -> bool {
        self.config.has_wipe_tower
    }

    /// Whether any skirt loops exist.
    pub fn has_skirt(&self) -> bool {
        !self.skirt.is_empty()
    }

    /// Whether any brim entities exist.
    pub fn has_brim(&self) -> bool {
        !self.brim.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_new() {
        let print = Print::new();
        assert!(print.is_empty());
        assert_eq!(print.object_count(), 0);
        assert!(!print.has_wipe_tower());
        assert!(!print.has_skirt());
    }

    #[test]
    fn test_print_object_new_has_origin_instance() {
        let obj = PrintObject::new("cube");
        assert_eq!(obj.name, "cube");
        assert_eq!(obj.instances.len(), 1);
        assert_eq!(obj.instances[0].shift, Point::zero());
        assert!(!obj.is_sliced());
        assert!(!obj.has_support());
    }

    #[test]
    fn test_print_object_instances() {
        let mut obj = PrintObject::new("cube");
        obj.add_instance(Point::new_scale(50.0, 0.0));
        assert_eq!(obj.instances.len(), 2);

        obj.set_instances(vec![PrintInstance::new(Point::new_scale(0.0, 25.0))]);
        assert_eq!(obj.instances.len(), 1);
    }

    #[test]
    fn test_region_extruder_resolution() {
        let region = PrintRegion::with_config(
            0,
            PrintRegionConfig::new()
                .with_perimeter_extruder(2)
                .with_infill_extruder(1)
                .with_solid_infill_extruder(3),
        );

        // 1-based assignments resolve to 0-based ids.
        assert_eq!(region.extruder(ExtrusionRole::Perimeter), 1);
        assert_eq!(region.extruder(ExtrusionRole::ExternalPerimeter), 1);
        assert_eq!(region.extruder(ExtrusionRole::InternalInfill), 0);
        assert_eq!(region.extruder(ExtrusionRole::SolidInfill), 2);
        assert_eq!(region.extruder(ExtrusionRole::TopSolidInfill), 2);
        // Ironing follows the solid infill assignment.
        assert_eq!(region.extruder(ExtrusionRole::Ironing), 2);
    }

    #[test]
    fn test_region_extruder_follow_current() {
        let region = PrintRegion::with_config(
            0,
            PrintRegionConfig::new().with_perimeter_extruder(0),
        );
        assert_eq!(region.config.extruder_for(ExtrusionRole::Perimeter), 0);
        assert_eq!(region.extruder(ExtrusionRole::Perimeter), 0);
    }

    #[test]
    fn test_print_region_lookup() {
        let mut print = Print::new();
        print.add_region(PrintRegion::new(0));
        print.add_region(PrintRegion::new(1));

        assert!(print.region(1).is_some());
        assert!(print.region(7).is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = PrintConfig::new()
            .with_wipe_tower(true)
            .with_skirt_height(3)
            .with_brim_width(5.0);
        assert!(config.has_wipe_tower);
        assert_eq!(config.skirt_height, 3);
        assert!((config.brim_width - 5.0).abs() < 1e-9);
    }
}
