//! Headless ARCAR demo
//!
//! Прогоняет scripted сессию: SimulatedTracker кормит Image Tracking сцену,
//! "пользователь" жмёт кнопки, затем переключается на Plane Detection и ставит машины.
//!
//! Usage: `arcar_core [config.toml]`

use arcar_core::*;

const IMAGE_TRACKING_FRAMES: u32 = 600;
const PLANE_DETECTION_FRAMES: u32 = 120;

fn main() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ArDemoConfig::load(path)?,
        None => ArDemoConfig::default(),
    };
    let seed = config.seed;

    let mut app = create_headless_app();
    set_log_level(LogLevel::Info);
    app.add_plugins(ArCorePlugin::new(config)?);
    app.world_mut().send_event(LoadSceneIntent {
        scene: DemoScene::ImageTracking,
    });
    app.update();

    log_info(&format!("Starting ARCAR headless session (seed: {})", seed));

    let mut tracker = SimulatedTracker::new(seed, &["CarAImage", "CarBImage", "UnknownPoster"]);
    for frame in 0..IMAGE_TRACKING_FRAMES {
        let batch = tracker.next_batch();
        if !batch.is_empty() {
            app.world_mut().send_event(batch);
        }

        match frame % 150 {
            30 => {
                app.world_mut().send_event(ColorButtonPressed {
                    button: ColorButton::Red,
                });
            }
            60 => {
                app.world_mut().send_event(ToggleRotationIntent);
            }
            90 => {
                app.world_mut().send_event(ToggleSoundIntent);
            }
            120 => {
                app.world_mut().send_event(ColorButtonPressed {
                    button: ColorButton::Blue,
                });
            }
            _ => {}
        }

        app.update();

        if frame % 100 == 0 {
            let registry = app.world().resource::<AnchorEntityRegistry>();
            log_info(&format!(
                "Frame {}: {} bound vehicles, last relevant: {:?}",
                frame,
                registry.len(),
                registry.last_relevant().and_then(|target| target.anchor_id.cloned())
            ));
        }
    }

    for line in registry_snapshot(app.world()) {
        log_info(&format!("  {}", line));
    }

    app.world_mut().send_event(LoadSceneIntent {
        scene: DemoScene::PlaneDetection,
    });
    app.update();

    for frame in 0..PLANE_DETECTION_FRAMES {
        if frame == 40 {
            app.world_mut().send_event(SelectPlacerIntent {
                family: VehicleFamily::CarB,
            });
        }
        if frame % 20 == 0 {
            let x = frame as f32 * 0.05;
            app.world_mut().send_event(PlacementTap {
                pose: Pose::from_translation(bevy::prelude::Vec3::new(x, 0.0, -1.0)),
            });
        }
        if frame == 100 {
            app.world_mut().send_event(ToggleSoundIntent);
        }
        app.update();
    }

    let mixer = app.world().resource::<AudioMixer>();
    log_info(&format!(
        "Session complete: Car A sound {:?}, Car B sound {:?}",
        mixer.state(VehicleFamily::CarA),
        mixer.state(VehicleFamily::CarB)
    ));

    Ok(())
}
