//! Demo сцены: Plane Detection / Image Tracking
//!
//! Сцена = набор активных подписок. Переключение:
//! 1. Unload: отписка (drop guards), destroy всех машин, clear last relevant, stop audio
//! 2. Load: подписка на источники новой сцены, placer A по умолчанию, audio stopped

use bevy::prelude::*;
use serde::Deserialize;

use crate::audio::AudioMixer;
use crate::config::ArDemoConfig;
use crate::logger;
use crate::placement::PlacementSelection;
use crate::registry::AnchorEntityRegistry;
use crate::subscription::{EventSource, SubscriptionGuard, Subscriptions};
use crate::tracking::{destroy_all_vehicles, PlacementTap, TrackedAnchorsChanged, WorldEntityFactory};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoScene {
    PlaneDetection,
    #[default]
    ImageTracking,
}

impl DemoScene {
    pub fn title(self) -> &'static str {
        match self {
            DemoScene::PlaneDetection => "Plane Detection",
            DemoScene::ImageTracking => "Image Tracking",
        }
    }

    pub fn sources(self) -> &'static [EventSource] {
        match self {
            DemoScene::PlaneDetection => &[EventSource::Placement, EventSource::UiActions],
            DemoScene::ImageTracking => &[EventSource::TrackedImages, EventSource::UiActions],
        }
    }
}

/// Кнопка выбора сцены в меню
#[derive(Event, Clone, Copy, Debug)]
pub struct LoadSceneIntent {
    pub scene: DemoScene,
}

/// Текущая сцена + её подписки (живут ровно пока сцена загружена)
#[derive(Resource, Debug, Default)]
pub struct ActiveScene {
    scene: Option<DemoScene>,
    guards: Vec<SubscriptionGuard>,
}

impl ActiveScene {
    pub fn scene(&self) -> Option<DemoScene> {
        self.scene
    }
}

/// Startup: загрузить сцену из конфига
pub fn load_initial_scene(world: &mut World) {
    let scene = world.resource::<ArDemoConfig>().initial_scene;
    load_scene(world, scene);
}

/// System: обработка LoadSceneIntent (последний intent за кадр побеждает)
pub fn switch_scene(world: &mut World) {
    let Some(intent) = world
        .resource_mut::<Events<LoadSceneIntent>>()
        .drain()
        .last()
    else {
        return;
    };

    if world.resource::<ActiveScene>().scene == Some(intent.scene) {
        logger::log(&format!("Scene '{}' already loaded", intent.scene.title()));
        return;
    }

    load_scene(world, intent.scene);
}

pub fn load_scene(world: &mut World, scene: DemoScene) {
    unload_scene(world);

    let guards: Vec<SubscriptionGuard> = {
        let mut subscriptions = world.resource_mut::<Subscriptions>();
        scene
            .sources()
            .iter()
            .map(|source| subscriptions.subscribe(*source))
            .collect()
    };

    // Input, накопленный до загрузки сцены, не относится к ней
    world.resource_mut::<Events<TrackedAnchorsChanged>>().clear();
    world.resource_mut::<Events<PlacementTap>>().clear();

    world.resource_mut::<AudioMixer>().stop_all();
    *world.resource_mut::<PlacementSelection>() = PlacementSelection::default();

    let mut active = world.resource_mut::<ActiveScene>();
    active.scene = Some(scene);
    active.guards = guards;

    logger::log_info(&format!("🎬 Scene '{}' loaded", scene.title()));
}

pub fn unload_scene(world: &mut World) {
    let (previous, guards) = {
        let mut active = world.resource_mut::<ActiveScene>();
        (active.scene.take(), std::mem::take(&mut active.guards))
    };
    // Отписка до destroy: events старой сцены больше не обрабатываются
    drop(guards);

    let Some(previous) = previous else {
        return;
    };

    world.resource_scope(|world, mut registry: Mut<AnchorEntityRegistry>| {
        let mut factory = WorldEntityFactory::new(world);
        registry.clear(&mut factory);
    });
    let placed = destroy_all_vehicles(world);
    world.resource_mut::<AudioMixer>().stop_all();

    logger::log_info(&format!(
        "Scene '{}' unloaded ({} placed vehicles destroyed)",
        previous.title(),
        placed
    ));
}
