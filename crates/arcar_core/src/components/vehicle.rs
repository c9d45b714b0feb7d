//! Vehicle компоненты: семейство, шаблон, pose/visibility заспавненной entity

use bevy::prelude::*;
use serde::Deserialize;
use std::fmt;

use super::anchor::Pose;
use super::capabilities::CapabilitySet;
use super::material::MaterialId;

/// Семейство машины (Car A / Car B). Определяет audio channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleFamily {
    CarA,
    CarB,
}

impl VehicleFamily {
    pub const ALL: [VehicleFamily; 2] = [VehicleFamily::CarA, VehicleFamily::CarB];

    pub fn index(self) -> usize {
        match self {
            VehicleFamily::CarA => 0,
            VehicleFamily::CarB => 1,
        }
    }
}

impl fmt::Display for VehicleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleFamily::CarA => f.write_str("Car A"),
            VehicleFamily::CarB => f.write_str("Car B"),
        }
    }
}

/// Шаблон entity (prefab): что спавнить и какие capabilities у результата
#[derive(Clone, Debug, PartialEq)]
pub struct EntityTemplate {
    pub name: String,
    pub family: VehicleFamily,
    /// Shared template material на каждую render surface
    pub surfaces: Vec<MaterialId>,
    pub capabilities: CapabilitySet,
    /// Градусы в секунду (для Rotatable)
    pub rotation_speed: f32,
}

/// Marker: заспавненная машина
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct VehicleEntity {
    pub family: VehicleFamily,
    pub template: String,
}

/// Pose entity (синхронизируется явно на каждом tracked update)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct EntityPose {
    pub pose: Pose,
}

/// Видимость entity (false пока anchor не tracked)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityVisibility {
    pub visible: bool,
}

impl Default for EntityVisibility {
    fn default() -> Self {
        Self { visible: true }
    }
}
