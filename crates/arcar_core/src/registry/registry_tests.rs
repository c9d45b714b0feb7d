//! Tests для AnchorEntityRegistry (без ECS, fake factory)

use std::collections::HashMap;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::components::{AnchorObservation, EntityTemplate, MaterialId, TrackingState};

#[derive(Debug, Clone, PartialEq)]
struct FakeEntity {
    template: String,
    pose: Pose,
    visible: bool,
}

/// In-memory factory: handle = u32, хранит живые entities
#[derive(Default)]
struct FakeFactory {
    next: u32,
    alive: HashMap<u32, FakeEntity>,
    destroyed: Vec<u32>,
}

impl EntityFactory for FakeFactory {
    type Handle = u32;

    fn instantiate(&mut self, template: &EntityTemplate, pose: Pose) -> u32 {
        let handle = self.next;
        self.next += 1;
        self.alive.insert(
            handle,
            FakeEntity {
                template: template.name.clone(),
                pose,
                visible: true,
            },
        );
        handle
    }

    fn apply_pose(&mut self, handle: u32, pose: Pose) {
        if let Some(entity) = self.alive.get_mut(&handle) {
            entity.pose = pose;
        }
    }

    fn set_visible(&mut self, handle: u32, visible: bool) {
        if let Some(entity) = self.alive.get_mut(&handle) {
            entity.visible = visible;
        }
    }

    fn destroy(&mut self, handle: u32) {
        assert!(self.alive.remove(&handle).is_some(), "double destroy of {handle}");
        self.destroyed.push(handle);
    }
}

fn template(name: &str, family: VehicleFamily, capabilities: CapabilitySet) -> EntityTemplate {
    EntityTemplate {
        name: name.to_string(),
        family,
        surfaces: Vec::<MaterialId>::new(),
        capabilities,
        rotation_speed: 10.0,
    }
}

fn car_policy() -> MarkerTable {
    MarkerTable::new()
        .with_marker("CarAImage", template("vehicle_a", VehicleFamily::CarA, CapabilitySet::all()))
        .with_marker(
            "CarBImage",
            template("vehicle_b", VehicleFamily::CarB, CapabilitySet::TINTABLE | CapabilitySet::SOUNDABLE),
        )
}

fn p(x: f32) -> Pose {
    Pose::from_translation(Vec3::new(x, 0.0, 0.0))
}

#[test]
fn test_added_anchor_becomes_last_relevant() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let car_a = AnchorId::from("CarAImage");

    let handle = registry
        .on_anchor_added(&car_a, p(1.0), &car_policy(), &mut factory)
        .map(|b| b.handle)
        .expect("CarAImage spawns");

    assert_eq!(registry.len(), 1);
    let target = registry.last_relevant().expect("last relevant set");
    assert_eq!(target.handle, handle);
    assert_eq!(target.anchor_id, Some(&car_a));
    assert_eq!(factory.alive[&handle].pose, p(1.0));
    assert_eq!(factory.alive[&handle].template, "vehicle_a");
}

#[test]
fn test_unrecognized_anchor_is_ignored() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();

    let spawned = registry.on_anchor_added(&AnchorId::from("Poster"), p(0.0), &car_policy(), &mut factory);

    assert!(spawned.is_none());
    assert!(registry.is_empty());
    assert!(registry.last_relevant().is_none());
    assert!(factory.alive.is_empty());
}

#[test]
fn test_marker_table_lists_markers() {
    let policy = car_policy();
    let mut markers: Vec<&str> = policy.markers().collect();
    markers.sort_unstable();

    assert_eq!(markers, vec!["CarAImage", "CarBImage"]);
    assert_eq!(policy.len(), 2);
    assert!(!policy.is_empty());
    assert!(MarkerTable::new().is_empty());
}

#[test]
fn test_closure_spawn_policy() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let policy = |id: &str| {
        id.starts_with("Plane").then(|| template("plane_car", VehicleFamily::CarB, CapabilitySet::empty()))
    };

    assert!(registry.on_anchor_added(&"Plane-1".into(), p(0.0), &policy, &mut factory).is_some());
    assert!(registry.on_anchor_added(&"Marker".into(), p(0.0), &policy, &mut factory).is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_re_add_destroys_previous_entity() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let car_a = AnchorId::from("CarAImage");

    let first = registry.on_anchor_added(&car_a, p(1.0), &car_policy(), &mut factory).unwrap().handle;
    let second = registry.on_anchor_added(&car_a, p(2.0), &car_policy(), &mut factory).unwrap().handle;

    assert_ne!(first, second);
    assert_eq!(registry.len(), 1);
    assert_eq!(factory.alive.len(), 1);
    assert_eq!(factory.destroyed, vec![first]);
}

#[test]
fn test_untracked_hides_then_tracked_restores_at_new_pose() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let car_a = AnchorId::from("CarAImage");
    let handle = registry.on_anchor_added(&car_a, p(1.0), &car_policy(), &mut factory).unwrap().handle;

    registry.on_anchor_updated(&car_a, p(5.0), false, &mut factory);
    assert!(!factory.alive[&handle].visible);
    assert_eq!(factory.alive[&handle].pose, p(1.0)); // pose не трогаем пока untracked
    let target = registry.last_relevant().expect("still relevant while hidden");
    assert_eq!(target.handle, handle);
    assert!(!target.visible);

    registry.on_anchor_updated(&car_a, p(2.0), true, &mut factory);
    assert!(factory.alive[&handle].visible);
    assert_eq!(factory.alive[&handle].pose, p(2.0));
    assert!(registry.binding("CarAImage").unwrap().visible);
}

#[test]
fn test_update_unknown_anchor_is_noop() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();

    let change = registry.on_anchor_updated(&"CarAImage".into(), p(1.0), true, &mut factory);
    assert_eq!(change, RelevanceChange::Unchanged);
    assert_eq!(registry.on_anchor_removed(&"CarAImage".into(), &mut factory), RelevanceChange::Unchanged);
    assert!(registry.last_relevant().is_none());
}

#[test]
fn test_removed_anchor_clears_last_relevant() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let car_a = AnchorId::from("CarAImage");
    let handle = registry.on_anchor_added(&car_a, p(1.0), &car_policy(), &mut factory).unwrap().handle;

    let change = registry.on_anchor_removed(&car_a, &mut factory);

    assert_eq!(change, RelevanceChange::Cleared);
    assert!(registry.last_relevant().is_none());
    assert!(!factory.alive.contains_key(&handle));
    assert!(!registry.apply_to_last_relevant(Capability::Soundable, |_| panic!("must not run")));
}

#[test]
fn test_removing_other_anchor_keeps_last_relevant() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    registry.on_anchor_added(&"CarAImage".into(), p(1.0), &car_policy(), &mut factory);
    let b = registry.on_anchor_added(&"CarBImage".into(), p(2.0), &car_policy(), &mut factory).unwrap().handle;

    let change = registry.on_anchor_removed(&"CarAImage".into(), &mut factory);

    assert_eq!(change, RelevanceChange::Unchanged);
    assert_eq!(registry.last_relevant().map(|t| t.handle), Some(b));
}

#[test]
fn test_tracked_update_switches_relevance_once() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let a = registry.on_anchor_added(&"CarAImage".into(), p(1.0), &car_policy(), &mut factory).unwrap().handle;
    registry.on_anchor_added(&"CarBImage".into(), p(2.0), &car_policy(), &mut factory);

    // "last event wins": tracked update A → A снова relevant
    assert_eq!(
        registry.on_anchor_updated(&"CarAImage".into(), p(1.5), true, &mut factory),
        RelevanceChange::Switched
    );
    assert_eq!(registry.last_relevant().map(|t| t.handle), Some(a));
    // Повторный update той же цели: не switch
    assert_eq!(
        registry.on_anchor_updated(&"CarAImage".into(), p(1.6), true, &mut factory),
        RelevanceChange::Unchanged
    );
    // Untracked update не меняет цель
    assert_eq!(
        registry.on_anchor_updated(&"CarBImage".into(), p(2.0), false, &mut factory),
        RelevanceChange::Unchanged
    );
    assert_eq!(registry.last_relevant().map(|t| t.handle), Some(a));
}

#[test]
fn test_apply_requires_capability() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    registry.on_anchor_added(&"CarBImage".into(), p(0.0), &car_policy(), &mut factory);

    let mut rotated = false;
    assert!(!registry.apply_to_last_relevant(Capability::Rotatable, |_| rotated = true));
    assert!(!rotated);

    let mut tinted = None;
    assert!(registry.apply_to_last_relevant(Capability::Tintable, |target| tinted = Some(target.family)));
    assert_eq!(tinted, Some(VehicleFamily::CarB));
}

#[test]
fn test_object_placed_is_not_owned() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();

    assert_eq!(
        registry.on_object_placed(77, VehicleFamily::CarA, CapabilitySet::ROTATABLE),
        RelevanceChange::Switched
    );
    assert_eq!(
        registry.on_object_placed(77, VehicleFamily::CarA, CapabilitySet::ROTATABLE),
        RelevanceChange::Unchanged
    );
    let target = registry.last_relevant().unwrap();
    assert_eq!(target.handle, 77);
    assert!(target.anchor_id.is_none());
    assert!(registry.is_empty());

    // clear не трогает placed entity (её нет в bindings)
    assert_eq!(registry.clear(&mut factory), RelevanceChange::Cleared);
    assert!(factory.destroyed.is_empty());
}

#[test]
fn test_clear_destroys_every_binding() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let policy = car_policy();
    let car_a = registry
        .on_anchor_added(&AnchorId::from("CarAImage"), p(0.0), &policy, &mut factory)
        .map(|b| b.handle)
        .unwrap();
    let car_b = registry
        .on_anchor_added(&AnchorId::from("CarBImage"), p(1.0), &policy, &mut factory)
        .map(|b| b.handle)
        .unwrap();

    assert_eq!(registry.clear(&mut factory), RelevanceChange::Cleared);

    let mut destroyed = factory.destroyed.clone();
    destroyed.sort();
    assert_eq!(destroyed, vec![car_a, car_b]);
    assert!(factory.alive.is_empty());
    assert!(registry.is_empty());
    assert!(registry.last_relevant().is_none());

    // Повторный clear: уничтожать нечего
    assert_eq!(registry.clear(&mut factory), RelevanceChange::Unchanged);
    assert_eq!(factory.destroyed.len(), 2);
}

#[test]
fn test_batch_add_and_update_ends_in_final_pose() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    // updated перечислен раньше added в исходных данных: порядок всё равно фиксирован
    let batch = TrackedAnchorsChanged {
        updated: vec![AnchorObservation::tracked("CarAImage", p(9.0))],
        added: vec![AnchorObservation::tracked("CarAImage", p(1.0))],
        removed: vec![],
    };

    let change = registry.apply_batch(&batch, &car_policy(), &mut factory);

    assert_eq!(change, RelevanceChange::Switched);
    let handle = registry.binding("CarAImage").unwrap().handle;
    assert_eq!(factory.alive[&handle].pose, p(9.0));
}

#[test]
fn test_batch_add_and_remove_leaks_nothing() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let batch = TrackedAnchorsChanged {
        added: vec![AnchorObservation::tracked("CarAImage", p(1.0))],
        updated: vec![AnchorObservation::tracked("CarAImage", p(2.0))],
        removed: vec![AnchorObservation::lost("CarAImage", p(2.0))],
    };

    let change = registry.apply_batch(&batch, &car_policy(), &mut factory);

    assert_eq!(change, RelevanceChange::Cleared);
    assert!(registry.is_empty());
    assert!(factory.alive.is_empty());
    assert!(registry.last_relevant().is_none());
}

#[test]
fn test_added_without_tracking_starts_hidden() {
    let mut registry = AnchorEntityRegistry::<u32>::new();
    let mut factory = FakeFactory::default();
    let batch = TrackedAnchorsChanged {
        added: vec![AnchorObservation::lost("CarBImage", p(3.0))],
        ..Default::default()
    };

    registry.apply_batch(&batch, &car_policy(), &mut factory);

    let binding = registry.binding("CarBImage").unwrap();
    assert!(!binding.visible);
    assert!(!factory.alive[&binding.handle].visible);
}

/// Случайные последовательности add/update/remove: инварианты registry держатся
#[test]
fn test_random_sequences_keep_invariants() {
    const MARKERS: [&str; 3] = ["CarAImage", "CarBImage", "Unknown"];
    let policy = car_policy();

    for seed in 0..20u64 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut registry = AnchorEntityRegistry::<u32>::new();
        let mut factory = FakeFactory::default();

        for _ in 0..200 {
            let id = AnchorId::from(MARKERS[rng.gen_range(0..MARKERS.len())]);
            let pose = p(rng.gen_range(-5.0..5.0));
            match rng.gen_range(0..3) {
                0 => {
                    registry.on_anchor_added(&id, pose, &policy, &mut factory);
                }
                1 => {
                    let tracking = if rng.gen_bool(0.7) {
                        TrackingState::Tracking
                    } else {
                        TrackingState::NotTracking
                    };
                    registry.on_anchor_updated(&id, pose, tracking.is_tracking(), &mut factory);
                }
                _ => {
                    let before = registry.binding(id.as_str()).map(|b| b.handle);
                    registry.on_anchor_removed(&id, &mut factory);
                    if let Some(destroyed) = before {
                        assert_ne!(registry.last_relevant().map(|t| t.handle), Some(destroyed));
                    }
                }
            }

            // Одна живая entity на binding, никаких утечек
            assert_eq!(factory.alive.len(), registry.len());
            for binding in registry.bindings() {
                let entity = &factory.alive[&binding.handle];
                assert_eq!(entity.visible, binding.visible);
            }
            if let Some(target) = registry.last_relevant() {
                assert!(factory.alive.contains_key(&target.handle));
            }
        }
    }
}
