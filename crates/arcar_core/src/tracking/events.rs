//! Tracking / placement events (от внешнего AR subsystem)
//!
//! # Flow
//! - Image tracking: `TrackedAnchorsChanged` batch → AnchorEntityRegistry::apply_batch
//! - Plane detection: `PlacementTap` → placer спавнит машину → `ObjectPlaced` → registry.on_object_placed

use bevy::prelude::*;

use crate::components::{AnchorObservation, Pose, VehicleFamily};

/// Один change notification tracker'а (три набора)
#[derive(Event, Clone, Debug, Default, PartialEq)]
pub struct TrackedAnchorsChanged {
    pub added: Vec<AnchorObservation>,
    pub updated: Vec<AnchorObservation>,
    pub removed: Vec<AnchorObservation>,
}

impl TrackedAnchorsChanged {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Тап по обнаруженной плоскости (AR raycast hit)
#[derive(Event, Clone, Copy, Debug)]
pub struct PlacementTap {
    pub pose: Pose,
}

/// Placement subsystem заспавнил объект. Anchor id нет.
#[derive(Event, Clone, Copy, Debug)]
pub struct ObjectPlaced {
    pub entity: Entity,
    pub family: VehicleFamily,
}
