//! EntityBinding + non-owning "last relevant" ссылка

use crate::components::{AnchorId, Capability, CapabilitySet, VehicleFamily};

use super::factory::EntityHandle;

/// Связь anchor ↔ заспавненная entity. Handle принадлежит binding'у эксклюзивно.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBinding<H> {
    pub anchor_id: AnchorId,
    pub handle: H,
    pub visible: bool,
    pub family: VehicleFamily,
    pub capabilities: CapabilitySet,
}

/// Что сейчас "last relevant". Никогда не владеет entity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RelevantRef<H> {
    /// Lookup key в bindings map
    Anchor(AnchorId),
    /// Placement mode: entity принадлежит placement subsystem
    Placed {
        handle: H,
        family: VehicleFamily,
        capabilities: CapabilitySet,
    },
}

/// Read-only view на цель UI action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevantTarget<'a, H> {
    /// `None` для placement-mode entity (anchor id нет)
    pub anchor_id: Option<&'a AnchorId>,
    pub handle: H,
    pub family: VehicleFamily,
    pub capabilities: CapabilitySet,
    pub visible: bool,
}

impl<H: EntityHandle> RelevantTarget<'_, H> {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.has(capability)
    }
}

/// Как операция повлияла на "last relevant" (для audio policy)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RelevanceChange {
    #[default]
    Unchanged,
    /// Другая entity стала last relevant
    Switched,
    /// Last relevant удалена, целей нет
    Cleared,
}

impl RelevanceChange {
    /// Последнее значимое изменение побеждает
    pub fn then(self, next: RelevanceChange) -> RelevanceChange {
        match next {
            RelevanceChange::Unchanged => self,
            other => other,
        }
    }

    /// Switched/Cleared → оба audio channel нужно остановить
    pub fn resets_audio(self) -> bool {
        !matches!(self, RelevanceChange::Unchanged)
    }
}
