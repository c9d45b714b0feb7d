//! Spin animation (FixedUpdate)

use bevy::prelude::*;

use crate::components::{EntityPose, Rotatable};

/// System: активные Rotatable накапливают `rotation_speed * dt` вокруг +Y
pub fn advance_rotation(time: Res<Time>, mut query: Query<&mut Rotatable>) {
    let delta = time.delta_secs();
    for mut rotatable in query.iter_mut() {
        if rotatable.active {
            rotatable.advance(delta);
        }
    }
}

/// Итоговая ориентация для рендера: anchor rotation × накопленный spin.
/// Sync pose от tracker'а не стирает spin.
pub fn rendered_rotation(pose: &EntityPose, rotatable: Option<&Rotatable>) -> Quat {
    match rotatable {
        Some(rotatable) => pose.pose.rotation * rotatable.spin(),
        None => pose.pose.rotation,
    }
}
