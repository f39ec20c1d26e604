//! Domain layer between `etidomo-api` and the CLI.
//!
//! - **[`Client`]**: facade over one server session. Connects lazily,
//!   serializes every exchange, and feeds the cache.
//! - **[`EntityStore`]**: lock-free cache of features and entities keyed by
//!   `(kind, id)`, populated per kind on first request.
//! - **Domain model** ([`model`]): [`Entity`] is a tagged union over
//!   lights, openings, scenarios and digital inputs.
//! - **[`CoreError`]**: the caller-facing error taxonomy. No raw transport
//!   or decoding error crosses this crate's boundary.

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, StatusOptions};
pub use config::{ClientConfig, Scheme};
pub use error::CoreError;
pub use store::EntityStore;

pub use model::{
    DigitalInput, DigitalInputType, Entity, EntityId, EntityKey, EntityKind, EntityStatus,
    Feature, Light, LightType, Opening, OpeningType, Scenario, ScenarioIcon, ScenarioStatus,
    ServerInfo,
};
