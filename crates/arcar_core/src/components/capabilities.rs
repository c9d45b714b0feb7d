//! Capabilities: Tintable, Rotatable, Soundable
//!
//! Набор capabilities фиксируется один раз при spawn (из EntityTemplate),
//! дальше UI actions проверяют `CapabilitySet` вместо поиска компонентов на каждом клике.

use bevy::prelude::*;
use bitflags::bitflags;
use serde::Deserialize;

use super::material::{MaterialId, MaterialLibrary, TintColor};
use super::vehicle::VehicleFamily;

/// Одна capability (для конфига и dispatch)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Tintable,
    Rotatable,
    Soundable,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CapabilitySet: u8 {
        const TINTABLE = 1 << 0;
        const ROTATABLE = 1 << 1;
        const SOUNDABLE = 1 << 2;
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        match capability {
            Capability::Tintable => CapabilitySet::TINTABLE,
            Capability::Rotatable => CapabilitySet::ROTATABLE,
            Capability::Soundable => CapabilitySet::SOUNDABLE,
        }
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter()
            .fold(CapabilitySet::empty(), |set, cap| set | CapabilitySet::from(cap))
    }
}

impl CapabilitySet {
    pub fn has(self, capability: Capability) -> bool {
        self.contains(capability.into())
    }
}

/// Tint всех render surfaces entity
///
/// Первый `apply_color` заменяет material каждой surface на private копию,
/// последующие вызовы переиспользуют копии (никогда не клонируют повторно).
#[derive(Component, Debug, Clone)]
pub struct Tintable {
    /// Текущий material каждой surface (template id до первого tint)
    surfaces: Vec<MaterialId>,
    /// Private копии; `None` пока tint ни разу не применялся
    instances: Option<Vec<MaterialId>>,
}

impl Tintable {
    pub fn new(surfaces: Vec<MaterialId>) -> Self {
        Self {
            surfaces,
            instances: None,
        }
    }

    pub fn surfaces(&self) -> &[MaterialId] {
        &self.surfaces
    }

    pub fn instance_count(&self) -> usize {
        self.instances.as_ref().map_or(0, Vec::len)
    }

    pub fn apply_color(&mut self, color: TintColor, library: &mut MaterialLibrary) {
        if self.instances.is_none() {
            let mut instances = Vec::with_capacity(self.surfaces.len());
            for surface in &mut self.surfaces {
                // Пропавший template: surface остаётся как есть
                if let Some(copy) = library.instantiate(*surface) {
                    *surface = copy;
                    instances.push(copy);
                }
            }
            self.instances = Some(instances);
        }

        if let Some(instances) = &self.instances {
            for id in instances {
                library.set_color(*id, color);
            }
        }
    }

    /// Забирает private копии для освобождения (ровно один раз)
    pub fn take_instances(&mut self) -> Vec<MaterialId> {
        self.instances.take().unwrap_or_default()
    }
}

/// Непрерывное вращение вокруг вертикальной оси (toggle)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Rotatable {
    /// Градусы в секунду
    pub rotation_speed: f32,
    pub active: bool,
    /// Накопленный spin (градусы, 0..360)
    pub angle_degrees: f32,
}

impl Rotatable {
    pub const DEFAULT_SPEED: f32 = 10.0;

    pub fn new(rotation_speed: f32) -> Self {
        Self {
            rotation_speed,
            active: false,
            angle_degrees: 0.0,
        }
    }

    /// Возвращает новое состояние
    pub fn toggle_rotation(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn advance(&mut self, delta_secs: f32) {
        if !self.active {
            return;
        }
        self.angle_degrees = (self.angle_degrees + self.rotation_speed * delta_secs).rem_euclid(360.0);
    }

    pub fn spin(&self) -> Quat {
        Quat::from_rotation_y(self.angle_degrees.to_radians())
    }
}

impl Default for Rotatable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPEED)
    }
}

/// Engine sound — канал выбирается по семейству машины
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Soundable {
    pub channel: VehicleFamily,
}
