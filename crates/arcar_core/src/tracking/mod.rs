//! Tracking domain — внешний AR tracker → ECS
//!
//! - events: TrackedAnchorsChanged, PlacementTap, ObjectPlaced
//! - systems: batch → AnchorEntityRegistry
//! - world_factory: EntityFactory поверх World (spawn/despawn + release materials)
//! - simulated: детерминированный tracker для headless demo / тестов

mod events;
mod simulated;
mod systems;
mod world_factory;

pub use events::*;
pub use simulated::*;
pub use systems::*;
pub use world_factory::*;
