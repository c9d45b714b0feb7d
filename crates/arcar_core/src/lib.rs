//! ARCAR Core
//!
//! Anchor-bound entity lifecycle для AR car demo на Bevy ECS 0.16 (headless).
//!
//! Внешние коллабораторы (AR tracking, рендер, UI, аудио-вывод) приходят как
//! events/resources; core только связывает anchors ↔ машины и маршрутизирует
//! UI actions на "last relevant" машину.
//!
//! Порядок Update (chain):
//! 1. switch_scene: LoadSceneIntent, подписки сцены
//! 2. select_placer: кнопки Car A / Car B
//! 3. process_tracked_anchor_changes: image tracking batch → registry
//! 4. place_selected_vehicle + handle_object_placed: plane detection
//! 5. resolve_color_buttons + handle_ui_intents: tint / rotate / play-stop
//!
//! FixedUpdate: advance_rotation (spin step).

use bevy::prelude::*;

pub mod actions;
pub mod audio;
pub mod components;
pub mod config;
pub mod logger;
pub mod placement;
pub mod registry;
pub mod rotation;
pub mod scenes;
pub mod subscription;
pub mod tracking;

pub use actions::{
    ApplyTintIntent, ColorButton, ColorButtonPressed, ToggleRotationIntent, ToggleSoundIntent, UiActionResult,
};
pub use audio::{AudioMixer, PlaybackState};
pub use components::*;
pub use config::{ArDemoConfig, ConfigError, Palette, TemplateCatalog};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter, MemoryLogger,
};
pub use placement::{PlacementSelection, SelectPlacerIntent};
pub use rotation::rendered_rotation;
pub use registry::{
    AnchorEntityRegistry, EntityBinding, EntityFactory, MarkerTable, RelevanceChange, RelevantTarget, SpawnPolicy,
};
pub use scenes::{ActiveScene, DemoScene, LoadSceneIntent};
pub use subscription::{subscribed, EventSource, SubscriptionGuard, Subscriptions};
pub use tracking::{ObjectPlaced, PlacementTap, SimulatedTracker, TrackedAnchorsChanged};

/// Главный plugin (конфиг уже провалидирован в `ArCorePlugin::new`)
pub struct ArCorePlugin {
    config: ArDemoConfig,
    materials: MaterialLibrary,
    catalog: TemplateCatalog,
    markers: MarkerTable,
}

impl ArCorePlugin {
    pub fn new(config: ArDemoConfig) -> Result<Self, ConfigError> {
        let mut materials = MaterialLibrary::default();
        let (catalog, markers) = config.build(&mut materials)?;
        Ok(Self {
            config,
            materials,
            catalog,
            markers,
        })
    }
}

impl Plugin for ArCorePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TrackedAnchorsChanged>()
            .add_event::<PlacementTap>()
            .add_event::<ObjectPlaced>()
            .add_event::<SelectPlacerIntent>()
            .add_event::<LoadSceneIntent>()
            .add_event::<ColorButtonPressed>()
            .add_event::<ApplyTintIntent>()
            .add_event::<ToggleRotationIntent>()
            .add_event::<ToggleSoundIntent>()
            .add_event::<UiActionResult>();

        app.insert_resource(self.config.clone())
            .insert_resource(self.materials.clone())
            .insert_resource(self.catalog.clone())
            .insert_resource(self.markers.clone())
            .insert_resource(Time::<Fixed>::from_hz(self.config.tick_rate_hz))
            .init_resource::<AnchorEntityRegistry>()
            .init_resource::<AudioMixer>()
            .init_resource::<Subscriptions>()
            .init_resource::<ActiveScene>()
            .init_resource::<PlacementSelection>();

        app.add_systems(Startup, scenes::load_initial_scene);

        app.add_systems(
            Update,
            (
                scenes::switch_scene,
                placement::select_placer.run_if(subscribed(EventSource::Placement)),
                tracking::process_tracked_anchor_changes.run_if(subscribed(EventSource::TrackedImages)),
                placement::place_selected_vehicle.run_if(subscribed(EventSource::Placement)),
                placement::handle_object_placed.run_if(subscribed(EventSource::Placement)),
                actions::resolve_color_buttons.run_if(subscribed(EventSource::UiActions)),
                actions::handle_ui_intents.run_if(subscribed(EventSource::UiActions)),
            )
                .chain(),
        );

        app.add_systems(FixedUpdate, rotation::advance_rotation);

        let mut markers: Vec<&str> = self.markers.markers().collect();
        markers.sort_unstable();
        log_info(&format!(
            "ArCorePlugin: {} vehicle templates, markers: [{}]",
            self.catalog.len(),
            markers.join(", ")
        ));
    }
}

/// Minimal Bevy App для headless режима (без ArCorePlugin)
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins);
    app
}

/// Snapshot bindings для сравнения прогонов (отсортирован по anchor id).
/// Yaw — итоговая ориентация для рендера (anchor × spin).
pub fn registry_snapshot(world: &World) -> Vec<String> {
    let registry = world.resource::<AnchorEntityRegistry>();
    let mut lines: Vec<String> = registry
        .bindings()
        .map(|binding| {
            let (position, yaw) = match world.get::<EntityPose>(binding.handle) {
                Some(pose) => {
                    let rendered = rendered_rotation(pose, world.get::<Rotatable>(binding.handle));
                    (pose.pose.translation, rendered.to_euler(EulerRot::YXZ).0.to_degrees())
                }
                None => (Vec3::NAN, f32::NAN),
            };
            format!(
                "{} family={:?} visible={} pos=({:.4}, {:.4}, {:.4}) yaw={:.3}",
                binding.anchor_id, binding.family, binding.visible, position.x, position.y, position.z, yaw
            )
        })
        .collect();
    lines.sort();
    lines
}
