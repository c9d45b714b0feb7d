//! UI actions — кнопки без payload → capability на last relevant
//!
//! UI только читает registry (`apply_to_last_relevant`), bindings не мутирует.
//! Нет цели / нет capability — no-op + `UiActionResult { applied: false }`.

use bevy::prelude::*;

use crate::audio::AudioMixer;
use crate::components::{Capability, MaterialLibrary, Rotatable, Soundable, Tintable, TintColor};
use crate::config::{ArDemoConfig, Palette};
use crate::logger;
use crate::registry::AnchorEntityRegistry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorButton {
    Red,
    Green,
    Blue,
}

impl ColorButton {
    pub fn color(self, palette: &Palette) -> TintColor {
        match self {
            ColorButton::Red => palette.red,
            ColorButton::Green => palette.green,
            ColorButton::Blue => palette.blue,
        }
    }
}

#[derive(Event, Clone, Copy, Debug)]
pub struct ApplyTintIntent {
    pub color: TintColor,
}

/// Нажатие цветной кнопки (цвет из палитры конфига)
#[derive(Event, Clone, Copy, Debug)]
pub struct ColorButtonPressed {
    pub button: ColorButton,
}

#[derive(Event, Clone, Copy, Debug, Default)]
pub struct ToggleRotationIntent;

#[derive(Event, Clone, Copy, Debug, Default)]
pub struct ToggleSoundIntent;

/// Результат UI action (для shell: feedback / disabled state кнопок)
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UiActionResult {
    pub capability: Capability,
    pub applied: bool,
}

/// System: ColorButtonPressed → ApplyTintIntent
pub fn resolve_color_buttons(
    mut pressed: EventReader<ColorButtonPressed>,
    config: Res<ArDemoConfig>,
    mut tints: EventWriter<ApplyTintIntent>,
) {
    for event in pressed.read() {
        tints.write(ApplyTintIntent {
            color: event.button.color(&config.palette),
        });
    }
}

/// System: все UI intents кадра (exclusive — нужен доступ к компонентам цели)
pub fn handle_ui_intents(world: &mut World) {
    let tints: Vec<ApplyTintIntent> = world.resource_mut::<Events<ApplyTintIntent>>().drain().collect();
    let rotations = world.resource_mut::<Events<ToggleRotationIntent>>().drain().count();
    let sounds = world.resource_mut::<Events<ToggleSoundIntent>>().drain().count();

    for intent in tints {
        let applied = apply_tint(world, intent.color);
        report(world, Capability::Tintable, applied);
    }
    for _ in 0..rotations {
        let applied = toggle_rotation(world);
        report(world, Capability::Rotatable, applied);
    }
    for _ in 0..sounds {
        let applied = toggle_sound(world);
        report(world, Capability::Soundable, applied);
    }
}

fn report(world: &mut World, capability: Capability, applied: bool) {
    world.send_event(UiActionResult { capability, applied });
}

pub fn apply_tint(world: &mut World, color: TintColor) -> bool {
    world.resource_scope(|world, registry: Mut<AnchorEntityRegistry>| {
        registry.apply_to_last_relevant(Capability::Tintable, |target| {
            world.resource_scope(|world, mut library: Mut<MaterialLibrary>| {
                if let Some(mut tintable) = world.get_mut::<Tintable>(target.handle) {
                    tintable.apply_color(color, &mut library);
                }
            });
        })
    })
}

pub fn toggle_rotation(world: &mut World) -> bool {
    world.resource_scope(|world, registry: Mut<AnchorEntityRegistry>| {
        registry.apply_to_last_relevant(Capability::Rotatable, |target| {
            if let Some(mut rotatable) = world.get_mut::<Rotatable>(target.handle) {
                let active = rotatable.toggle_rotation();
                logger::log_info(&format!("Rotation of {:?}: {}", target.handle, if active { "on" } else { "off" }));
            }
        })
    })
}

pub fn toggle_sound(world: &mut World) -> bool {
    world.resource_scope(|world, registry: Mut<AnchorEntityRegistry>| {
        registry.apply_to_last_relevant(Capability::Soundable, |target| {
            let channel = world
                .get::<Soundable>(target.handle)
                .map_or(target.family, |soundable| soundable.channel);
            world.resource_mut::<AudioMixer>().toggle(channel);
        })
    })
}
