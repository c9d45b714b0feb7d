//! Scene/object factory — внешний коллаборатор registry
//!
//! Registry только вызывает "instantiate template at pose" / "destroy handle";
//! как именно живут объекты (ECS World, движок, тестовый fake) — решает factory.

use bevy::prelude::Entity;
use std::fmt::Debug;
use std::hash::Hash;

use crate::components::{EntityTemplate, Pose};

/// Handle заспавненной entity (копируемый, сравнимый)
pub trait EntityHandle: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> EntityHandle for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

pub trait EntityFactory {
    type Handle: EntityHandle;

    fn instantiate(&mut self, template: &EntityTemplate, pose: Pose) -> Self::Handle;

    fn apply_pose(&mut self, handle: Self::Handle, pose: Pose);

    fn set_visible(&mut self, handle: Self::Handle, visible: bool);

    /// Уничтожает entity и все её локальные ресурсы (cloned materials)
    fn destroy(&mut self, handle: Self::Handle);
}

/// Для удобства: registry по умолчанию работает с ECS Entity
pub type DefaultHandle = Entity;
