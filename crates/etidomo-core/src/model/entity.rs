// ── Entity domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::status::EntityStatus;

/// Numeric identifier, unique within one entity kind.
pub type EntityId = i64;

/// Discriminant of the closed set of entity variants.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Light,
    Opening,
    Scenario,
    DigitalInput,
}

impl EntityKind {
    /// Name of the feature that advertises this kind.
    pub fn feature_name(self) -> &'static str {
        match self {
            Self::Light => "lights",
            Self::Opening => "openings",
            Self::Scenario => "scenarios",
            Self::DigitalInput => "digitalin",
        }
    }

    pub fn from_feature(name: &str) -> Option<Self> {
        match name {
            "lights" => Some(Self::Light),
            "openings" => Some(Self::Opening),
            "scenarios" => Some(Self::Scenario),
            "digitalin" => Some(Self::DigitalInput),
            _ => None,
        }
    }

    /// Whether status change commands exist for this kind.
    pub fn is_switchable(self) -> bool {
        !matches!(self, Self::DigitalInput)
    }
}

/// Cache identity: two entities of different kinds may share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

// ── Light ────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum LightType {
    /// On/off only.
    #[default]
    StepStep,
    Dimmable,
}

impl LightType {
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "STEP_STEP" => Some(Self::StepStep),
            "DIMMER" => Some(Self::Dimmable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub id: EntityId,
    pub name: String,
    pub status: EntityStatus,
    pub light_type: LightType,
    /// Always within `0..=100`.
    pub brightness: u8,
    pub floor_index: Option<i64>,
    pub room_index: Option<i64>,
}

// ── Opening ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OpeningType {
    #[default]
    OpenClose,
}

impl OpeningType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::OpenClose),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    /// The open actuator id.
    pub id: EntityId,
    pub close_id: EntityId,
    pub name: String,
    pub status: EntityStatus,
    pub opening_type: OpeningType,
    /// Partial-opening presets, as percentages.
    pub partial: Vec<i64>,
}

// ── Scenario ─────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioStatus {
    #[default]
    NotApplied,
    Ongoing,
    Applied,
}

impl ScenarioStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NotApplied),
            1 => Some(Self::Ongoing),
            2 => Some(Self::Applied),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioIcon {
    Lights,
    #[default]
    Generic,
}

impl ScenarioIcon {
    pub fn from_code(code: i64) -> Self {
        match code {
            14 => Self::Lights,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: EntityId,
    pub name: String,
    pub status: EntityStatus,
    pub scenario_status: ScenarioStatus,
    pub icon: ScenarioIcon,
    /// Raw icon code as sent by the server.
    pub icon_id: i64,
    pub user_defined: bool,
}

// ── Digital input ────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DigitalInputType {
    Status,
    #[default]
    Button,
}

impl DigitalInputType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Status),
            1 => Some(Self::Button),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalInput {
    pub id: EntityId,
    pub name: String,
    pub input_type: DigitalInputType,
    pub address: i64,
    pub ack: i64,
    pub radio_node_id: String,
    pub rf_radio_link_quality: i64,
    pub last_pressed: DateTime<Utc>,
}

// ── Entity ───────────────────────────────────────────────────────────

/// Tagged union over every entity variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entity {
    Light(Light),
    Opening(Opening),
    Scenario(Scenario),
    DigitalInput(DigitalInput),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Light(_) => EntityKind::Light,
            Self::Opening(_) => EntityKind::Opening,
            Self::Scenario(_) => EntityKind::Scenario,
            Self::DigitalInput(_) => EntityKind::DigitalInput,
        }
    }

    pub fn id(&self) -> EntityId {
        match self {
            Self::Light(e) => e.id,
            Self::Opening(e) => e.id,
            Self::Scenario(e) => e.id,
            Self::DigitalInput(e) => e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Light(e) => &e.name,
            Self::Opening(e) => &e.name,
            Self::Scenario(e) => &e.name,
            Self::DigitalInput(e) => &e.name,
        }
    }

    pub fn status(&self) -> EntityStatus {
        match self {
            Self::Light(e) => e.status,
            Self::Opening(e) => e.status,
            Self::Scenario(e) => e.status,
            Self::DigitalInput(_) => EntityStatus::NotApplicable,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(id: EntityId) -> Entity {
        Entity::Light(Light {
            id,
            name: "Kitchen".into(),
            status: EntityStatus::OnOpenTriggered,
            light_type: LightType::Dimmable,
            brightness: 40,
            floor_index: None,
            room_index: None,
        })
    }

    fn scenario(id: EntityId) -> Entity {
        Entity::Scenario(Scenario {
            id,
            name: "Night".into(),
            status: EntityStatus::OffStopped,
            scenario_status: ScenarioStatus::NotApplied,
            icon: ScenarioIcon::Lights,
            icon_id: 14,
            user_defined: true,
        })
    }

    #[test]
    fn same_id_different_kind_is_a_different_key() {
        assert_ne!(light(7).key(), scenario(7).key());
        assert_eq!(light(7).key(), EntityKey::new(EntityKind::Light, 7));
    }

    #[test]
    fn entity_serializes_with_kind_tag() {
        let json = serde_json::to_value(light(3)).unwrap();
        assert_eq!(json["kind"], "light");
        assert_eq!(json["brightness"], 40);
        assert_eq!(json["light_type"], "dimmable");
    }

    #[test]
    fn feature_names_round_trip() {
        use strum::IntoEnumIterator;
        for kind in EntityKind::iter() {
            assert_eq!(EntityKind::from_feature(kind.feature_name()), Some(kind));
        }
    }

    #[test]
    fn kind_parses_from_cli_spelling() {
        assert_eq!(
            "digital-input".parse::<EntityKind>().unwrap(),
            EntityKind::DigitalInput
        );
        assert!(!EntityKind::DigitalInput.is_switchable());
        assert!(EntityKind::Scenario.is_switchable());
    }
}
