//! Spawn policy: anchor id → EntityTemplate (или "не спавнить")

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::EntityTemplate;

pub trait SpawnPolicy {
    /// `None` — маркер не распознан, spawn не нужен
    fn template_for(&self, anchor_id: &str) -> Option<EntityTemplate>;
}

impl<F> SpawnPolicy for F
where
    F: Fn(&str) -> Option<EntityTemplate>,
{
    fn template_for(&self, anchor_id: &str) -> Option<EntityTemplate> {
        self(anchor_id)
    }
}

/// Таблица маркеров из конфига ("CarAImage" → vehicle_a, "CarBImage" → vehicle_b)
#[derive(Resource, Debug, Clone, Default)]
pub struct MarkerTable {
    markers: HashMap<String, EntityTemplate>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, marker: impl Into<String>, template: EntityTemplate) -> Self {
        self.insert(marker, template);
        self
    }

    /// Возвращает предыдущий шаблон для маркера, если был
    pub fn insert(&mut self, marker: impl Into<String>, template: EntityTemplate) -> Option<EntityTemplate> {
        self.markers.insert(marker.into(), template)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }
}

impl SpawnPolicy for MarkerTable {
    fn template_for(&self, anchor_id: &str) -> Option<EntityTemplate> {
        self.markers.get(anchor_id).cloned()
    }
}
