//! Render materials: shared template materials + per-instance копии для tint

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

/// RGBA цвет (linear, 0..1)
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TintColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "TintColor::opaque")]
    pub a: f32,
}

impl TintColor {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    fn opaque() -> f32 {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

/// Откуда взялся material
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialOrigin {
    /// Shared asset шаблона — никогда не мутируется tint'ом
    Template,
    /// Private копия, принадлежит одной entity
    InstanceOf(MaterialId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: TintColor,
    pub origin: MaterialOrigin,
}

/// Хранилище materials (заменяет render backend)
#[derive(Resource, Debug, Default, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<MaterialId, Material>,
    next_id: u32,
}

impl MaterialLibrary {
    fn insert(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next_id);
        self.next_id += 1;
        self.materials.insert(id, material);
        id
    }

    /// Регистрирует shared material шаблона
    pub fn register_template(&mut self, color: TintColor) -> MaterialId {
        self.insert(Material {
            color,
            origin: MaterialOrigin::Template,
        })
    }

    /// Создаёт private копию `source`. `None` если source не существует.
    pub fn instantiate(&mut self, source: MaterialId) -> Option<MaterialId> {
        let color = self.materials.get(&source)?.color;
        Some(self.insert(Material {
            color,
            origin: MaterialOrigin::InstanceOf(source),
        }))
    }

    /// Меняет цвет только у instance material; template не трогаем
    pub fn set_color(&mut self, id: MaterialId, color: TintColor) -> bool {
        match self.materials.get_mut(&id) {
            Some(material) if material.origin != MaterialOrigin::Template => {
                material.color = color;
                true
            }
            _ => false,
        }
    }

    /// Освобождает instance material. Templates не освобождаются.
    pub fn release(&mut self, id: MaterialId) -> bool {
        match self.materials.get(&id) {
            Some(material) if material.origin != MaterialOrigin::Template => {
                self.materials.remove(&id);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn instance_count(&self) -> usize {
        self.materials
            .values()
            .filter(|m| matches!(m.origin, MaterialOrigin::InstanceOf(_)))
            .count()
    }
}
