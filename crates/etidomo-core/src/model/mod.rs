// ── Domain model ──

pub mod entity;
pub mod feature;
pub mod status;

pub use entity::{
    DigitalInput, DigitalInputType, Entity, EntityId, EntityKey, EntityKind, Light, LightType,
    Opening, OpeningType, Scenario, ScenarioIcon, ScenarioStatus,
};
pub use feature::{Feature, ServerInfo};
pub use status::EntityStatus;
