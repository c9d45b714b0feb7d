//! Tracking systems: change notifications → AnchorEntityRegistry

use bevy::prelude::*;

use super::events::TrackedAnchorsChanged;
use super::world_factory::WorldEntityFactory;
use crate::audio::AudioMixer;
use crate::registry::{AnchorEntityRegistry, MarkerTable, RelevanceChange};

/// System: обработка всех batch'ей кадра (exclusive — registry + World в одном проходе)
///
/// Внутри batch порядок фиксирован: added → updated → removed.
/// Если last relevant сменилась/очистилась — оба audio channel останавливаются.
pub fn process_tracked_anchor_changes(world: &mut World) {
    let batches: Vec<TrackedAnchorsChanged> = world
        .resource_mut::<Events<TrackedAnchorsChanged>>()
        .drain()
        .collect();
    if batches.is_empty() {
        return;
    }

    let mut change = RelevanceChange::Unchanged;
    world.resource_scope(|world, mut registry: Mut<AnchorEntityRegistry>| {
        world.resource_scope(|world, markers: Mut<MarkerTable>| {
            let mut factory = WorldEntityFactory::new(world);
            for batch in &batches {
                change = change.then(registry.apply_batch(batch, &*markers, &mut factory));
            }
        });
    });

    if change.resets_audio() {
        world.resource_mut::<AudioMixer>().stop_all();
    }
}
