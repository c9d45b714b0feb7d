//! Anchor данные от внешнего tracking subsystem: AnchorId, Pose, TrackingState

use bevy::prelude::*;
use std::borrow::Borrow;
use std::fmt;

/// Стабильный идентификатор anchor'а (имя reference image из библиотеки маркеров)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(String);

impl AnchorId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnchorId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AnchorId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for AnchorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// World-space pose (position + orientation)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Tracking state anchor'а на момент наблюдения
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackingState {
    #[default]
    Tracking,
    /// Limited / None — маркер вне кадра, pose устарела
    NotTracking,
}

impl TrackingState {
    pub fn is_tracking(self) -> bool {
        matches!(self, TrackingState::Tracking)
    }
}

/// Одно наблюдение anchor'а (immutable snapshot от tracker'а)
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorObservation {
    pub id: AnchorId,
    pub pose: Pose,
    pub tracking: TrackingState,
}

impl AnchorObservation {
    pub fn tracked(id: impl Into<AnchorId>, pose: Pose) -> Self {
        Self {
            id: id.into(),
            pose,
            tracking: TrackingState::Tracking,
        }
    }

    pub fn lost(id: impl Into<AnchorId>, pose: Pose) -> Self {
        Self {
            id: id.into(),
            pose,
            tracking: TrackingState::NotTracking,
        }
    }
}
