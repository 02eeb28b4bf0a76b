//! Extrusion entity model: roles, attributes, paths, loops, collections.
//!
//! This is the vocabulary the ordering core consumes: upstream slicing
//! produces extrusion entities grouped per layer region, and the order
//! builder reorders references to them without copying geometry.
//!
//! # Reference
//!
//! Corresponds to:
//! - `src/libslic3r/ExtrusionEntity.hpp` (roles, paths, loops)
//! - `src/libslic3r/ExtrusionEntityCollection.hpp` (collections, `no_sort`)

use crate::geometry::{Point, Polygon, Polyline};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of an extrusion path, determining how it is scheduled and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtrusionRole {
    /// No role assigned.
    #[default]
    None,
    /// Internal perimeter wall.
    Perimeter,
    /// Outermost visible perimeter wall.
    ExternalPerimeter,
    /// Perimeter printed over air.
    OverhangPerimeter,
    /// Sparse internal infill.
    InternalInfill,
    /// Solid infill.
    SolidInfill,
    /// Top visible solid infill.
    TopSolidInfill,
    /// Low-flow smoothing pass over a top surface.
    Ironing,
    /// Infill bridging over air.
    BridgeInfill,
    /// Thin gap fill between walls.
    GapFill,
    /// Priming skirt around the print.
    Skirt,
    /// Bed-adhesion brim attached to the first layer.
    Brim,
    /// Support structure body.
    SupportMaterial,
    /// Dense support interface layers.
    SupportMaterialInterface,
    /// Wipe/prime tower body.
    WipeTower,
    /// Custom G-code driven extrusion.
    Custom,
}

impl ExtrusionRole {
    /// Check if this is a perimeter role (internal, external, or overhang).
    pub fn is_perimeter(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::Perimeter
                | ExtrusionRole::ExternalPerimeter
                | ExtrusionRole::OverhangPerimeter
        )
    }

    /// Check if this is an infill role.
    pub fn is_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::InternalInfill
                | ExtrusionRole::SolidInfill
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::BridgeInfill
                | ExtrusionRole::Ironing
        )
    }

    /// Check if this is a solid infill role.
    pub fn is_solid_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::SolidInfill | ExtrusionRole::TopSolidInfill
        )
    }

    /// Check if this role extrudes over air.
    pub fn is_bridge(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::BridgeInfill | ExtrusionRole::OverhangPerimeter
        )
    }

    /// Check if this is a support role.
    pub fn is_support(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::SupportMaterial | ExtrusionRole::SupportMaterialInterface
        )
    }

    /// Check if this is the ironing role.
    pub fn is_ironing(&self) -> bool {
        matches!(self, ExtrusionRole::Ironing)
    }

    /// Check if this role is visible from the outside of the print.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::ExternalPerimeter
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::Skirt
                | ExtrusionRole::Brim
        )
    }

    /// Get a human-readable name for this role.
    pub fn name(&self) -> &'static str {
        match self {
            ExtrusionRole::None => "None",
            ExtrusionRole::Perimeter => "Perimeter",
            ExtrusionRole::ExternalPerimeter => "External perimeter",
            ExtrusionRole::OverhangPerimeter => "Overhang perimeter",
            ExtrusionRole::InternalInfill => "Internal infill",
            ExtrusionRole::SolidInfill => "Solid infill",
            ExtrusionRole::TopSolidInfill => "Top solid infill",
            ExtrusionRole::Ironing => "Ironing",
            ExtrusionRole::BridgeInfill => "Bridge infill",
            ExtrusionRole::GapFill => "Gap fill",
            ExtrusionRole::Skirt => "Skirt",
            ExtrusionRole::Brim => "Brim",
            ExtrusionRole::SupportMaterial => "Support material",
            ExtrusionRole::SupportMaterialInterface => "Support material interface",
            ExtrusionRole::WipeTower => "Wipe tower",
            ExtrusionRole::Custom => "Custom",
        }
    }
}

impl fmt::Display for ExtrusionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Physical attributes shared by every point of one extrusion entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionAttributes {
    /// The role of this extrusion.
    pub role: ExtrusionRole,
    /// Extrusion width in mm.
    pub width: CoordF,
    /// Layer height in mm.
    pub height: CoordF,
    /// Extruded volume per distance, mm^3/mm.
    pub mm3_per_mm: CoordF,
}

impl ExtrusionAttributes {
    /// Create attributes with the given role and standard 0.4mm nozzle defaults.
    pub fn new(role: ExtrusionRole) -> Self {
        let width = 0.45;
        let height = 0.2;
        Self {
            role,
            width,
            height,
            mm3_per_mm: rounded_rectangle_cross_section(width, height),
        }
    }

    /// Create attributes with explicit width/height, deriving mm3_per_mm from
    /// the rounded-rectangle cross-section model.
    pub fn with_size(role: ExtrusionRole, width: CoordF, height: CoordF) -> Self {
        Self {
            role,
            width,
            height,
            mm3_per_mm: rounded_rectangle_cross_section(width, height),
        }
    }
}

impl Default for ExtrusionAttributes {
    fn default() -> Self {
        Self::new(ExtrusionRole::None)
    }
}

/// Cross-section area (mm^2) of an extrusion modelled as a rectangle with
/// semicircular ends: width x height minus the corner loss.
#[inline]
pub fn rounded_rectangle_cross_section(width: CoordF, height: CoordF) -> CoordF {
    height * (width - height * (1.0 - std::f64::consts::PI / 4.0))
}

/// An open extrusion path: a polyline with uniform attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionPath {
    pub polyline: Polyline,
    pub attributes: ExtrusionAttributes,
}

impl ExtrusionPath {
    /// Create a new extrusion path.
    pub fn new(polyline: Polyline, attributes: ExtrusionAttributes) -> Self {
        Self {
            polyline,
            attributes,
        }
    }

    /// The role of this path.
    #[inline]
    pub fn role(&self) -> ExtrusionRole {
        self.attributes.role
    }

    /// First point of the path.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.polyline.first_point()
    }

    /// Last point of the path.
    #[inline]
    pub fn last_point(&self) -> Point {
        self.polyline.last_point()
    }

    /// Total path length in scaled units.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.polyline.length()
    }

    /// Check if the path has fewer than two points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polyline.len() < 2
    }
}

/// A closed extrusion loop: a polygon with uniform attributes.
///
/// The loop's stored orientation is the upstream print direction; the order
/// builder may traverse it reversed and cut it open at any vertex (the seam).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionLoop {
    pub polygon: Polygon,
    pub attributes: ExtrusionAttributes,
}

impl ExtrusionLoop {
    /// Create a new extrusion loop.
    pub fn new(polygon: Polygon, attributes: ExtrusionAttributes) -> Self {
        Self {
            polygon,
            attributes,
        }
    }

    /// The role of this loop.
    #[inline]
    pub fn role(&self) -> ExtrusionRole {
        self.attributes.role
    }

    /// First point of the loop in stored orientation.
    #[inline]
    pub fn first_point(&self) -> Point {
        self.polygon[0]
    }

    /// Total loop length in scaled units.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.polygon.perimeter()
    }

    /// Check if the loop is degenerate.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygon.len() < 3
    }
}

/// An extrusion entity: an open path, a closed loop, or a collection tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtrusionEntity {
    /// An open path.
    Path(ExtrusionPath),
    /// A closed loop.
    Loop(ExtrusionLoop),
    /// An ordered group of entities. When `no_sort` is set the internal
    /// order is contractual and the shortest-path selector must keep it.
    Collection {
        entities: Vec<ExtrusionEntity>,
        no_sort: bool,
    },
}

impl ExtrusionEntity {
    /// Create a sortable collection.
    pub fn collection(entities: Vec<ExtrusionEntity>) -> Self {
        ExtrusionEntity::Collection {
            entities,
            no_sort: false,
        }
    }

    /// Create an order-preserving collection.
    pub fn collection_no_sort(entities: Vec<ExtrusionEntity>) -> Self {
        ExtrusionEntity::Collection {
            entities,
            no_sort: true,
        }
    }

    /// The role of this entity. Collections report the role of their first
    /// leaf, `None` when empty.
    pub fn role(&self) -> ExtrusionRole {
        match self {
            ExtrusionEntity::Path(path) => path.role(),
            ExtrusionEntity::Loop(l) => l.role(),
            ExtrusionEntity::Collection { entities, .. } => entities
                .first()
                .map(|e| e.role())
                .unwrap_or(ExtrusionRole::None),
        }
    }

    /// Check if this entity is a collection.
    #[inline]
    pub fn is_collection(&self) -> bool {
        matches!(self, ExtrusionEntity::Collection { .. })
    }

    /// Check if this entity is a closed loop.
    #[inline]
    pub fn is_loop(&self) -> bool {
        matches!(self, ExtrusionEntity::Loop(_))
    }

    /// Check if this entity contains no printable geometry.
    pub fn is_empty(&self) -> bool {
        match self {
            ExtrusionEntity::Path(path) => path.is_empty(),
            ExtrusionEntity::Loop(l) => l.is_empty(),
            ExtrusionEntity::Collection { entities, .. } => {
                entities.iter().all(|e| e.is_empty())
            }
        }
    }

    /// First point in stored orientation; `None` for an empty entity.
    pub fn first_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(path) => {
                (!path.is_empty()).then(|| path.first_point())
            }
            ExtrusionEntity::Loop(l) => (!l.is_empty()).then(|| l.first_point()),
            ExtrusionEntity::Collection { entities, .. } => {
                entities.iter().find_map(|e| e.first_point())
            }
        }
    }

    /// Last point in stored orientation; for loops this equals the first
    /// point (the loop closes on itself).
    pub fn last_point(&self) -> Option<Point> {
        match self {
            ExtrusionEntity::Path(path) => {
                (!path.is_empty()).then(|| path.last_point())
            }
            ExtrusionEntity::Loop(l) => (!l.is_empty()).then(|| l.first_point()),
            ExtrusionEntity::Collection { entities, .. } => {
                entities.iter().rev().find_map(|e| e.last_point())
            }
        }
    }

    /// Total length of all geometry in scaled units.
    pub fn length(&self) -> CoordF {
        match self {
            ExtrusionEntity::Path(path) => path.length(),
            ExtrusionEntity::Loop(l) => l.length(),
            ExtrusionEntity::Collection { entities, .. } => {
                entities.iter().map(|e| e.length()).sum()
            }
        }
    }

    /// Flatten this entity into leaf references in traversal order, all
    /// carrying the given flipped flag. Flipping a collection walks its
    /// children back to front so the leaves keep the collection's own
    /// entry/exit contract.
    pub fn flatten(&self, flipped: bool) -> Vec<ExtrusionEntityReference<'_>> {
        let mut out = Vec::new();
        self.flatten_into(flipped, &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, flipped: bool, out: &mut Vec<ExtrusionEntityReference<'a>>) {
        match self {
            ExtrusionEntity::Collection { entities, .. } => {
                if flipped {
                    for e in entities.iter().rev() {
                        e.flatten_into(flipped, out);
                    }
                } else {
                    for e in entities {
                        e.flatten_into(flipped, out);
                    }
                }
            }
            _ => out.push(ExtrusionEntityReference::new(self, flipped)),
        }
    }
}

/// A non-owning reference to one extrusion entity plus a traversal direction.
///
/// `flipped` means the entity should be printed opposite to its stored
/// orientation; endpoint queries respect it.
#[derive(Debug, Clone, Copy)]
pub struct ExtrusionEntityReference<'a> {
    entity: &'a ExtrusionEntity,
    flipped: bool,
}

impl<'a> ExtrusionEntityReference<'a> {
    /// Create a reference to an entity.
    pub fn new(entity: &'a ExtrusionEntity, flipped: bool) -> Self {
        Self { entity, flipped }
    }

    /// The referenced entity.
    #[inline]
    pub fn entity(&self) -> &'a ExtrusionEntity {
        self.entity
    }

    /// Whether the entity is traversed opposite to its stored orientation.
    #[inline]
    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// The role of the referenced entity.
    #[inline]
    pub fn role(&self) -> ExtrusionRole {
        self.entity.role()
    }

    /// First point in traversal order.
    pub fn first_point(&self) -> Option<Point> {
        if self.flipped {
            self.entity.last_point()
        } else {
            self.entity.first_point()
        }
    }

    /// Last point in traversal order.
    pub fn last_point(&self) -> Option<Point> {
        if self.flipped {
            self.entity.first_point()
        } else {
            self.entity.last_point()
        }
    }
}
