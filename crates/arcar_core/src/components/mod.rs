//! ECS компоненты и value-типы
//!
//! Организация по доменам:
//! - anchor: наблюдения tracker'а (AnchorId, Pose, TrackingState, AnchorObservation)
//! - vehicle: семейство, шаблон, pose/visibility заспавненной машины
//! - capabilities: Tintable, Rotatable, Soundable + CapabilitySet
//! - material: shared/instance materials (MaterialLibrary)

pub mod anchor;
pub mod capabilities;
pub mod material;
pub mod vehicle;

pub use anchor::*;
pub use capabilities::*;
pub use material::*;
pub use vehicle::*;
