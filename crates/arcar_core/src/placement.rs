//! Plane detection placement
//!
//! Два placer'а (Car A / Car B), включён ровно один. Тап по плоскости спавнит
//! машину активного семейства и шлёт `ObjectPlaced`; registry запоминает её как
//! last relevant (без binding — anchor id у placement нет, removal не бывает).

use bevy::prelude::*;

use crate::audio::AudioMixer;
use crate::components::{Capability, VehicleFamily};
use crate::config::TemplateCatalog;
use crate::logger;
use crate::registry::{AnchorEntityRegistry, EntityFactory};
use crate::tracking::{capabilities_of, ObjectPlaced, PlacementTap, WorldEntityFactory};

/// Какой placer сейчас включён
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementSelection {
    pub active: VehicleFamily,
}

impl Default for PlacementSelection {
    fn default() -> Self {
        Self {
            active: VehicleFamily::CarA,
        }
    }
}

impl PlacementSelection {
    pub fn is_enabled(&self, family: VehicleFamily) -> bool {
        self.active == family
    }
}

/// Кнопки "Car A" / "Car B"
#[derive(Event, Clone, Copy, Debug)]
pub struct SelectPlacerIntent {
    pub family: VehicleFamily,
}

pub fn select_placer(
    mut intents: EventReader<SelectPlacerIntent>,
    mut selection: ResMut<PlacementSelection>,
) {
    for intent in intents.read() {
        selection.active = intent.family;
        logger::log_info(&format!("Switched to {} placement.", intent.family));
    }
}

/// System: активный placer спавнит машину на месте тапа
pub fn place_selected_vehicle(world: &mut World) {
    let taps: Vec<PlacementTap> = world.resource_mut::<Events<PlacementTap>>().drain().collect();
    if taps.is_empty() {
        return;
    }

    let family = world.resource::<PlacementSelection>().active;
    let Some(template) = world.resource::<TemplateCatalog>().for_family(family).cloned() else {
        logger::log_warning(&format!("No template configured for {}, tap ignored", family));
        return;
    };

    for tap in taps {
        let entity = WorldEntityFactory::new(world).instantiate(&template, tap.pose);
        logger::log_info(&format!("Placed {} at position: {:?}", family, tap.pose.translation));
        world.send_event(ObjectPlaced { entity, family });
    }
}

/// System: ObjectPlaced → registry.on_object_placed (capabilities запрашиваются один раз)
pub fn handle_object_placed(world: &mut World) {
    let placed: Vec<ObjectPlaced> = world.resource_mut::<Events<ObjectPlaced>>().drain().collect();

    for event in placed {
        if !world.entities().contains(event.entity) {
            logger::log_warning(&format!("Placed entity {:?} no longer exists", event.entity));
            continue;
        }

        let capabilities = capabilities_of(world, event.entity);
        if !capabilities.has(Capability::Rotatable) {
            logger::log_warning(&format!("Placed {:?} does not have a Rotatable component", event.entity));
        }

        let change = world
            .resource_mut::<AnchorEntityRegistry>()
            .on_object_placed(event.entity, event.family, capabilities);
        if change.resets_audio() {
            world.resource_mut::<AudioMixer>().stop_all();
        }
    }
}
