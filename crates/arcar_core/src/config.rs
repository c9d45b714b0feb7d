//! ArDemoConfig — шаблоны машин, таблица маркеров, палитра, сцена по умолчанию
//!
//! Загружается из TOML (все поля опциональны, default = демо с двумя машинами).

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::components::{
    Capability, EntityTemplate, MaterialLibrary, Rotatable, TintColor, VehicleFamily,
};
use crate::registry::MarkerTable;
use crate::scenes::DemoScene;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config has no vehicle templates")]
    NoTemplates,
    #[error("duplicate template name '{0}'")]
    DuplicateTemplate(String),
    #[error("duplicate marker '{0}'")]
    DuplicateMarker(String),
    #[error("marker '{marker}' references unknown template '{template}'")]
    UnknownTemplate { marker: String, template: String },
    #[error("tick_rate_hz must be a positive finite number, got {0}")]
    InvalidTickRate(f64),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TemplateConfig {
    pub name: String,
    pub family: VehicleFamily,
    /// Цвет каждой render surface шаблона (shared materials)
    #[serde(default = "TemplateConfig::default_surfaces")]
    pub surface_colors: Vec<TintColor>,
    #[serde(default = "TemplateConfig::all_capabilities")]
    pub capabilities: Vec<Capability>,
    #[serde(default = "TemplateConfig::default_rotation_speed")]
    pub rotation_speed: f32,
}

impl TemplateConfig {
    fn default_surfaces() -> Vec<TintColor> {
        // Кузов + стёкла + колёса
        vec![
            TintColor::rgb(0.8, 0.8, 0.8),
            TintColor::rgb(0.2, 0.3, 0.4),
            TintColor::rgb(0.1, 0.1, 0.1),
        ]
    }

    fn all_capabilities() -> Vec<Capability> {
        vec![Capability::Tintable, Capability::Rotatable, Capability::Soundable]
    }

    fn default_rotation_speed() -> f32 {
        Rotatable::DEFAULT_SPEED
    }

    fn with_family(name: &str, family: VehicleFamily) -> Self {
        Self {
            name: name.to_string(),
            family,
            surface_colors: Self::default_surfaces(),
            capabilities: Self::all_capabilities(),
            rotation_speed: Self::default_rotation_speed(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarkerConfig {
    /// Имя reference image
    pub marker: String,
    pub template: String,
}

/// Цвета кнопок Red / Green / Blue
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub red: TintColor,
    pub green: TintColor,
    pub blue: TintColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            red: TintColor::RED,
            green: TintColor::GREEN,
            blue: TintColor::BLUE,
        }
    }
}

#[derive(Resource, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArDemoConfig {
    pub templates: Vec<TemplateConfig>,
    pub markers: Vec<MarkerConfig>,
    pub palette: Palette,
    pub initial_scene: DemoScene,
    /// FixedUpdate частота (rotation step)
    pub tick_rate_hz: f64,
    /// Seed для SimulatedTracker
    pub seed: u64,
}

impl Default for ArDemoConfig {
    fn default() -> Self {
        Self {
            templates: vec![
                TemplateConfig::with_family("vehicle_a", VehicleFamily::CarA),
                TemplateConfig::with_family("vehicle_b", VehicleFamily::CarB),
            ],
            markers: vec![
                MarkerConfig {
                    marker: "CarAImage".to_string(),
                    template: "vehicle_a".to_string(),
                },
                MarkerConfig {
                    marker: "CarBImage".to_string(),
                    template: "vehicle_b".to_string(),
                },
            ],
            palette: Palette::default(),
            initial_scene: DemoScene::ImageTracking,
            tick_rate_hz: 60.0,
            seed: 42,
        }
    }
}

impl ArDemoConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Регистрирует template materials и строит каталог шаблонов + таблицу маркеров
    pub fn build(&self, library: &mut MaterialLibrary) -> Result<(TemplateCatalog, MarkerTable), ConfigError> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate(self.tick_rate_hz));
        }
        if self.templates.is_empty() {
            return Err(ConfigError::NoTemplates);
        }

        let mut catalog = TemplateCatalog::default();
        for template in &self.templates {
            if catalog.templates.contains_key(&template.name) {
                return Err(ConfigError::DuplicateTemplate(template.name.clone()));
            }
            let surfaces = template
                .surface_colors
                .iter()
                .map(|color| library.register_template(*color))
                .collect();
            catalog.insert(EntityTemplate {
                name: template.name.clone(),
                family: template.family,
                surfaces,
                capabilities: template.capabilities.iter().copied().collect(),
                rotation_speed: template.rotation_speed,
            });
        }

        let mut markers = MarkerTable::new();
        let mut seen = HashSet::new();
        for entry in &self.markers {
            if !seen.insert(entry.marker.as_str()) {
                return Err(ConfigError::DuplicateMarker(entry.marker.clone()));
            }
            let template = catalog
                .get(&entry.template)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownTemplate {
                    marker: entry.marker.clone(),
                    template: entry.template.clone(),
                })?;
            markers.insert(entry.marker.clone(), template);
        }

        Ok((catalog, markers))
    }
}

/// Все шаблоны по имени (placement mode выбирает по семейству)
#[derive(Resource, Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, EntityTemplate>,
    by_family: HashMap<VehicleFamily, String>,
}

impl TemplateCatalog {
    pub fn insert(&mut self, template: EntityTemplate) {
        // Первый шаблон семейства: placement default
        self.by_family
            .entry(template.family)
            .or_insert_with(|| template.name.clone());
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Option<&EntityTemplate> {
        self.templates.get(name)
    }

    pub fn for_family(&self, family: VehicleFamily) -> Option<&EntityTemplate> {
        self.by_family.get(&family).and_then(|name| self.templates.get(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
