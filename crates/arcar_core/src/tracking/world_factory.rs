//! EntityFactory поверх ECS World
//!
//! Exclusive systems (&mut World) — spawn/despawn видны сразу, без deferred Commands,
//! поэтому add + update одного anchor'а в одном batch работают с уже живой entity.

use bevy::prelude::*;

use crate::components::{
    Capability, CapabilitySet, EntityPose, EntityTemplate, EntityVisibility, MaterialLibrary, Pose,
    Rotatable, Soundable, Tintable, VehicleEntity,
};
use crate::logger;
use crate::registry::EntityFactory;

pub struct WorldEntityFactory<'w> {
    world: &'w mut World,
}

impl<'w> WorldEntityFactory<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }
}

impl EntityFactory for WorldEntityFactory<'_> {
    type Handle = Entity;

    fn instantiate(&mut self, template: &EntityTemplate, pose: Pose) -> Entity {
        let mut entity = self.world.spawn((
            VehicleEntity {
                family: template.family,
                template: template.name.clone(),
            },
            EntityPose { pose },
            EntityVisibility::default(),
        ));

        if template.capabilities.has(Capability::Tintable) {
            entity.insert(Tintable::new(template.surfaces.clone()));
        }
        if template.capabilities.has(Capability::Rotatable) {
            entity.insert(Rotatable::new(template.rotation_speed));
        }
        if template.capabilities.has(Capability::Soundable) {
            entity.insert(Soundable {
                channel: template.family,
            });
        }

        entity.id()
    }

    fn apply_pose(&mut self, handle: Entity, pose: Pose) {
        if let Some(mut entity_pose) = self.world.get_mut::<EntityPose>(handle) {
            entity_pose.pose = pose;
        }
    }

    fn set_visible(&mut self, handle: Entity, visible: bool) {
        if let Some(mut visibility) = self.world.get_mut::<EntityVisibility>(handle) {
            visibility.visible = visible;
        }
    }

    fn destroy(&mut self, handle: Entity) {
        // Private material копии освобождаются ровно один раз: здесь
        let instances = self
            .world
            .get_mut::<Tintable>(handle)
            .map(|mut tintable| tintable.take_instances())
            .unwrap_or_default();

        if !instances.is_empty() {
            if let Some(mut library) = self.world.get_resource_mut::<MaterialLibrary>() {
                for id in &instances {
                    library.release(*id);
                }
            }
            logger::log(&format!("Released {} material instances of {:?}", instances.len(), handle));
        }

        if !self.world.despawn(handle) {
            logger::log_warning(&format!("Entity {:?} already despawned", handle));
        }
    }
}

/// Capabilities entity по её компонентам (placement mode: запрашиваются один раз при bind)
pub fn capabilities_of(world: &World, entity: Entity) -> CapabilitySet {
    let mut set = CapabilitySet::empty();
    if world.get::<Tintable>(entity).is_some() {
        set |= CapabilitySet::TINTABLE;
    }
    if world.get::<Rotatable>(entity).is_some() {
        set |= CapabilitySet::ROTATABLE;
    }
    if world.get::<Soundable>(entity).is_some() {
        set |= CapabilitySet::SOUNDABLE;
    }
    set
}

/// Уничтожает все машины в мире (scene unload, включая placed без binding)
pub fn destroy_all_vehicles(world: &mut World) -> usize {
    let vehicles: Vec<Entity> = world
        .query_filtered::<Entity, With<VehicleEntity>>()
        .iter(world)
        .collect();

    let mut factory = WorldEntityFactory::new(world);
    for entity in &vehicles {
        factory.destroy(*entity);
    }
    vehicles.len()
}
