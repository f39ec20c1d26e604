// ── Server capabilities ──

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;

/// A capability advertised by the server's feature list (e.g. `"lights"`).
///
/// Compared by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature {
    name: String,
}

impl Feature {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entity kind listed by this feature, if this client knows one.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        EntityKind::from_feature(&self.name)
    }
}

impl From<&str> for Feature {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Identification block returned alongside the feature list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub keycode: String,
    pub software_version: String,
    pub server_type: String,
    pub board: String,
    pub serial_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_features_map_to_kinds() {
        assert_eq!(Feature::from("lights").entity_kind(), Some(EntityKind::Light));
        assert_eq!(
            Feature::from("digitalin").entity_kind(),
            Some(EntityKind::DigitalInput)
        );
        assert_eq!(Feature::from("energy").entity_kind(), None);
    }
}
