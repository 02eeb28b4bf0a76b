//! Wipe tower tool-change plans.
//!
//! # Overview
//!
//! In a multi-material print the wipe tower generator plans, ahead of G-code
//! emission, which tool changes happen at which print z. The ordering core
//! does not generate tower geometry; it only looks up the plan matching an
//! extruder switch and records it on the per-extruder output entry so the
//! downstream writer can interleave the tower moves at the right spot.
//!
//! # Reference
//!
//! - `src/libslic3r/GCode/WipeTower.hpp`
//! - `src/libslic3r/GCode/WipeTowerIntegration.hpp`

use serde::{Deserialize, Serialize};

use crate::EPSILON;

/// One planned tool change at a print z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolChangePlan {
    /// Print z of the change in mm.
    pub print_z: f64,
    /// Layer height of the tower at this z in mm.
    pub layer_height: f64,
    /// Tool active before the change (0-based), `-1` for the initial prime.
    pub initial_tool: i32,
    /// Tool active after the change (0-based).
    pub new_tool: i32,
}

impl ToolChangePlan {
    pub fn new(print_z: f64, layer_height: f64, initial_tool: i32, new_tool: i32) -> Self {
        Self {
            print_z,
            layer_height,
            initial_tool,
            new_tool,
        }
    }
}

/// Lookup surface over the tool-change plans of a whole print.
///
/// Plans are kept sorted by print z; within one z they keep the order the
/// generator produced, which is the order the changes execute in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WipeTowerIntegration {
    plans: Vec<ToolChangePlan>,
}

impl WipeTowerIntegration {
    /// Wrap the plans produced by the wipe tower generator.
    pub fn new(mut plans: Vec<ToolChangePlan>) -> Self {
        plans.sort_by(|a, b| {
            a.print_z
                .partial_cmp(&b.print_z)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self { plans }
    }

    /// Check if the tower has no planned tool changes at all.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// All planned changes at a print z, within epsilon, in execution order.
    pub fn plan_for_layer(&self, print_z: f64) -> &[ToolChangePlan] {
        let start = self
            .plans
            .partition_point(|plan| plan.print_z < print_z - EPSILON);
        let end = self
            .plans
            .partition_point(|plan| plan.print_z <= print_z + EPSILON);
        &self.plans[start..end]
    }

    /// The plan switching to `new_extruder` at a print z, if the generator
    /// scheduled one. Sparse layers may have no plan; that is not an error.
    pub fn tool_change(&self, print_z: f64, new_extruder: u32) -> Option<&ToolChangePlan> {
        self.plan_for_layer(print_z)
            .iter()
            .find(|plan| plan.new_tool == new_extruder as i32)
    }
}
