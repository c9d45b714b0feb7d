//! SimulatedTracker — детерминированный источник TrackedAnchorsChanged
//!
//! Заменяет камеру + image tracking в headless demo и тестах: маркеры появляются,
//! дрожат (jitter), теряют tracking, возвращаются и удаляются. Один seed → одна сессия.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::events::TrackedAnchorsChanged;
use crate::components::{AnchorId, AnchorObservation, Pose};

/// Вероятности переходов за кадр
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerProfile {
    pub appear: f64,
    pub lose: f64,
    pub recover: f64,
    pub remove: f64,
    /// Максимальный jitter позиции (метры)
    pub jitter: f32,
}

impl Default for TrackerProfile {
    fn default() -> Self {
        Self {
            appear: 0.1,
            lose: 0.05,
            recover: 0.2,
            remove: 0.02,
            jitter: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MarkerPhase {
    Absent,
    Tracking,
    Lost,
}

#[derive(Debug)]
struct SimulatedMarker {
    id: AnchorId,
    origin: Vec3,
    pose: Pose,
    phase: MarkerPhase,
}

#[derive(Debug)]
pub struct SimulatedTracker {
    rng: ChaCha8Rng,
    profile: TrackerProfile,
    markers: Vec<SimulatedMarker>,
}

impl SimulatedTracker {
    pub fn new(seed: u64, marker_names: &[&str]) -> Self {
        Self::with_profile(seed, marker_names, TrackerProfile::default())
    }

    pub fn with_profile(seed: u64, marker_names: &[&str], profile: TrackerProfile) -> Self {
        let markers = marker_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Маркеры лежат на столе в ряд, 40 см друг от друга
                let origin = Vec3::new(i as f32 * 0.4, 0.0, -0.5);
                SimulatedMarker {
                    id: AnchorId::from(*name),
                    origin,
                    pose: Pose::from_translation(origin),
                    phase: MarkerPhase::Absent,
                }
            })
            .collect();

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            profile,
            markers,
        }
    }

    /// Один кадр tracker'а
    pub fn next_batch(&mut self) -> TrackedAnchorsChanged {
        let mut batch = TrackedAnchorsChanged::default();
        let profile = self.profile;

        for marker in &mut self.markers {
            match marker.phase {
                MarkerPhase::Absent => {
                    if self.rng.gen_bool(profile.appear) {
                        marker.pose = jittered(&mut self.rng, marker.origin, profile.jitter);
                        marker.phase = MarkerPhase::Tracking;
                        batch.added.push(AnchorObservation::tracked(marker.id.clone(), marker.pose));
                    }
                }
                MarkerPhase::Tracking => {
                    if self.rng.gen_bool(profile.remove) {
                        marker.phase = MarkerPhase::Absent;
                        batch.removed.push(AnchorObservation::lost(marker.id.clone(), marker.pose));
                    } else if self.rng.gen_bool(profile.lose) {
                        marker.phase = MarkerPhase::Lost;
                        batch.updated.push(AnchorObservation::lost(marker.id.clone(), marker.pose));
                    } else {
                        marker.pose = jittered(&mut self.rng, marker.origin, profile.jitter);
                        batch.updated.push(AnchorObservation::tracked(marker.id.clone(), marker.pose));
                    }
                }
                MarkerPhase::Lost => {
                    if self.rng.gen_bool(profile.remove) {
                        marker.phase = MarkerPhase::Absent;
                        batch.removed.push(AnchorObservation::lost(marker.id.clone(), marker.pose));
                    } else if self.rng.gen_bool(profile.recover) {
                        marker.phase = MarkerPhase::Tracking;
                        marker.pose = jittered(&mut self.rng, marker.origin, profile.jitter);
                        batch.updated.push(AnchorObservation::tracked(marker.id.clone(), marker.pose));
                    } else {
                        batch.updated.push(AnchorObservation::lost(marker.id.clone(), marker.pose));
                    }
                }
            }
        }

        batch
    }
}

fn jittered(rng: &mut ChaCha8Rng, origin: Vec3, jitter: f32) -> Pose {
    if jitter <= 0.0 {
        return Pose::from_translation(origin);
    }
    let offset = Vec3::new(
        rng.gen_range(-jitter..jitter),
        0.0,
        rng.gen_range(-jitter..jitter),
    );
    let yaw = rng.gen_range(-0.05..0.05_f32);
    Pose::new(origin + offset, Quat::from_rotation_y(yaw))
}
