//! AnchorEntityRegistry — anchor ↔ entity bindings + "last relevant" цель UI
//!
//! # Ownership
//! - Registry — единственный владелец и мутатор bindings
//! - `EntityBinding::handle` живёт ровно пока binding в map
//! - "last relevant" — lookup по AnchorId (или non-owning placed handle), не второй owner
//!
//! # Batch order
//! added → updated → removed, независимо от порядка внутри контейнеров.
//! Anchor, добавленный и обновлённый в одном batch, оказывается в финальной pose;
//! добавленный и удалённый в одном batch — не оставляет entity.

mod binding;
mod factory;
mod policy;

#[cfg(test)]
mod registry_tests;

pub use binding::{EntityBinding, RelevanceChange, RelevantTarget};
pub use factory::{DefaultHandle, EntityFactory, EntityHandle};
pub use policy::{MarkerTable, SpawnPolicy};

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{AnchorId, Capability, CapabilitySet, Pose, VehicleFamily};
use crate::logger;
use crate::tracking::TrackedAnchorsChanged;
use binding::RelevantRef;

#[derive(Resource, Debug)]
pub struct AnchorEntityRegistry<H: EntityHandle = DefaultHandle> {
    bindings: HashMap<AnchorId, EntityBinding<H>>,
    last_relevant: Option<RelevantRef<H>>,
}

impl<H: EntityHandle> Default for AnchorEntityRegistry<H> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
            last_relevant: None,
        }
    }
}

impl<H: EntityHandle> AnchorEntityRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor обнаружен: spawn по policy, overwrite-and-destroy для существующего binding
    pub fn on_anchor_added<F, P>(
        &mut self,
        anchor_id: &AnchorId,
        pose: Pose,
        policy: &P,
        factory: &mut F,
    ) -> Option<&EntityBinding<H>>
    where
        F: EntityFactory<Handle = H>,
        P: SpawnPolicy + ?Sized,
    {
        let Some(template) = policy.template_for(anchor_id.as_str()) else {
            logger::log(&format!("Anchor '{}' not in spawn policy, ignored", anchor_id));
            return None;
        };

        // Сначала уничтожаем старую entity: никаких дубликатов на один anchor
        if let Some(previous) = self.bindings.remove(anchor_id) {
            logger::log(&format!(
                "Anchor '{}' re-added, destroying previous entity {:?}",
                anchor_id, previous.handle
            ));
            factory.destroy(previous.handle);
        }

        let handle = factory.instantiate(&template, pose);
        logger::log_info(&format!(
            "🚗 Spawned '{}' ({}) for anchor '{}' as {:?}",
            template.name, template.family, anchor_id, handle
        ));

        self.last_relevant = Some(RelevantRef::Anchor(anchor_id.clone()));
        self.bindings.insert(
            anchor_id.clone(),
            EntityBinding {
                anchor_id: anchor_id.clone(),
                handle,
                visible: true,
                family: template.family,
                capabilities: template.capabilities,
            },
        );
        self.bindings.get(anchor_id)
    }

    /// Pose/visibility update. Unknown anchor — no-op.
    pub fn on_anchor_updated<F>(
        &mut self,
        anchor_id: &AnchorId,
        pose: Pose,
        tracked: bool,
        factory: &mut F,
    ) -> RelevanceChange
    where
        F: EntityFactory<Handle = H>,
    {
        let Some(binding) = self.bindings.get_mut(anchor_id) else {
            return RelevanceChange::Unchanged;
        };

        if !tracked {
            if binding.visible {
                logger::log(&format!("Anchor '{}' lost tracking, hiding {:?}", anchor_id, binding.handle));
            }
            binding.visible = false;
            factory.set_visible(binding.handle, false);
            return RelevanceChange::Unchanged;
        }

        if !binding.visible {
            logger::log(&format!("Anchor '{}' tracking resumed", anchor_id));
        }
        binding.visible = true;
        factory.set_visible(binding.handle, true);
        factory.apply_pose(binding.handle, pose);

        let already_relevant = matches!(&self.last_relevant, Some(RelevantRef::Anchor(id)) if id == anchor_id);
        self.last_relevant = Some(RelevantRef::Anchor(anchor_id.clone()));
        if already_relevant {
            RelevanceChange::Unchanged
        } else {
            RelevanceChange::Switched
        }
    }

    /// Anchor удалён tracker'ом: destroy entity + cloned resources, erase binding
    pub fn on_anchor_removed<F>(&mut self, anchor_id: &AnchorId, factory: &mut F) -> RelevanceChange
    where
        F: EntityFactory<Handle = H>,
    {
        let Some(binding) = self.bindings.remove(anchor_id) else {
            return RelevanceChange::Unchanged;
        };

        factory.destroy(binding.handle);
        logger::log_info(&format!("🗑️ Anchor '{}' removed, destroyed {:?}", anchor_id, binding.handle));

        if matches!(&self.last_relevant, Some(RelevantRef::Anchor(id)) if id == anchor_id) {
            self.last_relevant = None;
            RelevanceChange::Cleared
        } else {
            RelevanceChange::Unchanged
        }
    }

    /// Placement mode: entity заспавнена placement subsystem, anchor id нет.
    /// Registry не владеет ей — только запоминает как last relevant.
    pub fn on_object_placed(
        &mut self,
        handle: H,
        family: VehicleFamily,
        capabilities: CapabilitySet,
    ) -> RelevanceChange {
        let same = matches!(&self.last_relevant, Some(RelevantRef::Placed { handle: h, .. }) if *h == handle);
        self.last_relevant = Some(RelevantRef::Placed {
            handle,
            family,
            capabilities,
        });
        logger::log_info(&format!("Placed {} as {:?}", family, handle));

        if same {
            RelevanceChange::Unchanged
        } else {
            RelevanceChange::Switched
        }
    }

    /// Один change notification от tracker'а, строго added → updated → removed
    pub fn apply_batch<F, P>(
        &mut self,
        batch: &TrackedAnchorsChanged,
        policy: &P,
        factory: &mut F,
    ) -> RelevanceChange
    where
        F: EntityFactory<Handle = H>,
        P: SpawnPolicy + ?Sized,
    {
        let mut change = RelevanceChange::Unchanged;

        for observation in &batch.added {
            if self.on_anchor_added(&observation.id, observation.pose, policy, factory).is_some() {
                change = change.then(RelevanceChange::Switched);
                // Добавлен уже без tracking: сразу прячем
                if !observation.tracking.is_tracking() {
                    self.on_anchor_updated(&observation.id, observation.pose, false, factory);
                }
            }
        }

        for observation in &batch.updated {
            let tracked = observation.tracking.is_tracking();
            change = change.then(self.on_anchor_updated(&observation.id, observation.pose, tracked, factory));
        }

        for observation in &batch.removed {
            change = change.then(self.on_anchor_removed(&observation.id, factory));
        }

        change
    }

    /// Уничтожает все bindings (scene unload)
    pub fn clear<F>(&mut self, factory: &mut F) -> RelevanceChange
    where
        F: EntityFactory<Handle = H>,
    {
        for (anchor_id, binding) in self.bindings.drain() {
            logger::log(&format!("Unloading anchor '{}' ({:?})", anchor_id, binding.handle));
            factory.destroy(binding.handle);
        }

        if self.last_relevant.take().is_some() {
            RelevanceChange::Cleared
        } else {
            RelevanceChange::Unchanged
        }
    }

    pub fn last_relevant(&self) -> Option<RelevantTarget<'_, H>> {
        match self.last_relevant.as_ref()? {
            RelevantRef::Anchor(anchor_id) => {
                let binding = self.bindings.get(anchor_id)?;
                Some(RelevantTarget {
                    anchor_id: Some(&binding.anchor_id),
                    handle: binding.handle,
                    family: binding.family,
                    capabilities: binding.capabilities,
                    visible: binding.visible,
                })
            }
            RelevantRef::Placed {
                handle,
                family,
                capabilities,
            } => Some(RelevantTarget {
                anchor_id: None,
                handle: *handle,
                family: *family,
                capabilities: *capabilities,
                visible: true,
            }),
        }
    }

    /// UI action на last relevant. `false` — цели нет или capability отсутствует (не ошибка).
    pub fn apply_to_last_relevant<A>(&self, capability: Capability, action: A) -> bool
    where
        A: FnOnce(RelevantTarget<'_, H>),
    {
        let Some(target) = self.last_relevant() else {
            logger::log(&format!("No vehicle spawned yet, {:?} action does nothing", capability));
            return false;
        };

        if !target.has(capability) {
            logger::log_warning(&format!(
                "Last relevant {:?} lacks {:?} capability, action ignored",
                target.handle, capability
            ));
            return false;
        }

        action(target);
        true
    }

    pub fn binding(&self, anchor_id: &str) -> Option<&EntityBinding<H>> {
        self.bindings.get(anchor_id)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &EntityBinding<H>> {
        self.bindings.values()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
