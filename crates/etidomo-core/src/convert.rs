// ── Wire-to-domain conversions ──
//
// Turns raw list-response nodes into typed entities. Conversion is
// tolerant: only the identifier is required, every other field falls back
// to a default when absent or malformed.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{
    DigitalInput, DigitalInputType, Entity, EntityKind, EntityStatus, Feature, Light, LightType,
    Opening, OpeningType, Scenario, ScenarioIcon, ScenarioStatus, ServerInfo,
};

const UNKNOWN_NAME: &str = "Unknown";
const DEFAULT_BRIGHTNESS: u8 = 100;

// ── Helpers ────────────────────────────────────────────────────────

/// Read an integer, accepting numeric strings.
fn int(node: &Value, key: &str) -> Option<i64> {
    match node.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Read a scalar as text, accepting numbers.
fn text(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn name(node: &Value) -> String {
    node.get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_owned()
}

fn status(node: &Value) -> EntityStatus {
    int(node, "status").map_or(EntityStatus::Unknown, EntityStatus::from_code)
}

/// Clamp a reported percentage into `0..=100`.
pub fn normalize_brightness(raw: i64) -> u8 {
    u8::try_from(raw.clamp(0, 100)).unwrap_or(DEFAULT_BRIGHTNESS)
}

// ── Per-kind conversions ───────────────────────────────────────────

fn light(node: &Value, id: i64) -> Light {
    Light {
        id,
        name: name(node),
        status: status(node),
        light_type: node
            .get("type")
            .and_then(Value::as_str)
            .and_then(LightType::from_wire)
            .unwrap_or_default(),
        brightness: int(node, "perc").map_or(DEFAULT_BRIGHTNESS, normalize_brightness),
        floor_index: int(node, "floor_ind"),
        room_index: int(node, "room_ind"),
    }
}

fn opening(node: &Value, id: i64) -> Opening {
    let partial = node
        .get("partial")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();

    Opening {
        id,
        close_id: int(node, "close_act_id").unwrap_or(id),
        name: name(node),
        status: status(node),
        opening_type: int(node, "type")
            .and_then(OpeningType::from_code)
            .unwrap_or_default(),
        partial,
    }
}

fn scenario(node: &Value, id: i64) -> Scenario {
    let icon_id = int(node, "icon_id").unwrap_or(0);
    Scenario {
        id,
        name: name(node),
        status: status(node),
        scenario_status: int(node, "scenario_status")
            .and_then(ScenarioStatus::from_code)
            .unwrap_or_default(),
        icon: ScenarioIcon::from_code(icon_id),
        icon_id,
        user_defined: int(node, "user-defined").is_some_and(|v| v != 0),
    }
}

fn digital_input(node: &Value, id: i64) -> DigitalInput {
    DigitalInput {
        id,
        name: name(node),
        input_type: int(node, "type")
            .and_then(DigitalInputType::from_code)
            .unwrap_or_default(),
        address: int(node, "addr").unwrap_or(0),
        ack: int(node, "ack").unwrap_or(1),
        radio_node_id: text(node, "radio_node_id").unwrap_or_else(|| "00000000".into()),
        rf_radio_link_quality: int(node, "rf_radio_link_quality").unwrap_or(0),
        last_pressed: int(node, "utc_time")
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

/// Field holding the identifier for each kind.
fn id_field(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Light | EntityKind::DigitalInput => "act_id",
        EntityKind::Opening => "open_act_id",
        EntityKind::Scenario => "id",
    }
}

/// Convert one node, or `None` (with a warning) if it has no identifier.
pub fn entity_from_node(kind: EntityKind, node: &Value) -> Option<Entity> {
    let field = id_field(kind);
    let Some(id) = int(node, field) else {
        warn!(%kind, field, node = %node, "skipping node without identifier");
        return None;
    };

    Some(match kind {
        EntityKind::Light => Entity::Light(light(node, id)),
        EntityKind::Opening => Entity::Opening(opening(node, id)),
        EntityKind::Scenario => Entity::Scenario(scenario(node, id)),
        EntityKind::DigitalInput => Entity::DigitalInput(digital_input(node, id)),
    })
}

/// Convert every node of a list response (`array` or `list` key).
pub fn entities_from_response(kind: EntityKind, response: &Value) -> Vec<Entity> {
    let Some(nodes) = response
        .get("array")
        .or_else(|| response.get("list"))
        .and_then(Value::as_array)
    else {
        debug!(%kind, "list response carries no nodes");
        return Vec::new();
    };

    nodes
        .iter()
        .filter_map(|node| entity_from_node(kind, node))
        .collect()
}

/// Split a feature-list response into features and server identification.
pub fn features_from_response(response: &Value) -> (Vec<Feature>, ServerInfo) {
    let features = response
        .get("list")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item.as_str() {
                    Some(name) if !name.is_empty() => Some(Feature::new(name)),
                    _ => {
                        warn!(item = %item, "skipping malformed feature entry");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let info = ServerInfo {
        keycode: text(response, "keycode").unwrap_or_default(),
        software_version: text(response, "swver").unwrap_or_default(),
        server_type: text(response, "type").unwrap_or_default(),
        board: text(response, "board").unwrap_or_default(),
        serial_number: text(response, "serial").unwrap_or_default(),
    };

    (features, info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn light_node_is_fully_mapped() {
        let node = json!({
            "act_id": 12,
            "name": "Living room",
            "status": 1,
            "type": "DIMMER",
            "perc": 46,
            "floor_ind": 0,
            "room_ind": 3
        });
        let Some(Entity::Light(light)) = entity_from_node(EntityKind::Light, &node) else {
            panic!("expected a light");
        };
        assert_eq!(light.id, 12);
        assert_eq!(light.name, "Living room");
        assert_eq!(light.status, EntityStatus::OnOpenTriggered);
        assert_eq!(light.light_type, LightType::Dimmable);
        assert_eq!(light.brightness, 46);
        assert_eq!(light.room_index, Some(3));
    }

    #[test]
    fn brightness_is_clamped_and_defaulted() {
        for (perc, expected) in [(json!(255), 100), (json!(-4), 0), (json!("70"), 70)] {
            let node = json!({"act_id": 1, "perc": perc});
            let Some(Entity::Light(light)) = entity_from_node(EntityKind::Light, &node) else {
                panic!("expected a light");
            };
            assert_eq!(light.brightness, expected);
        }

        let Some(Entity::Light(light)) = entity_from_node(EntityKind::Light, &json!({"act_id": 1}))
        else {
            panic!("expected a light");
        };
        assert_eq!(light.brightness, 100);
        assert_eq!(light.light_type, LightType::StepStep);
        assert_eq!(light.name, "Unknown");
        assert_eq!(light.status, EntityStatus::Unknown);
    }

    #[test]
    fn opening_close_id_defaults_to_open_id() {
        let node = json!({"open_act_id": 51, "name": "Garage", "status": 2, "partial": [25, 50]});
        let Some(Entity::Opening(opening)) = entity_from_node(EntityKind::Opening, &node) else {
            panic!("expected an opening");
        };
        assert_eq!(opening.id, 51);
        assert_eq!(opening.close_id, 51);
        assert_eq!(opening.status, EntityStatus::Closed);
        assert_eq!(opening.opening_type, OpeningType::OpenClose);
        assert_eq!(opening.partial, vec![25, 50]);
    }

    #[test]
    fn scenario_flags() {
        let node = json!({
            "id": 7,
            "name": "Good night",
            "status": 0,
            "scenario_status": 2,
            "icon_id": 14,
            "user-defined": 1
        });
        let Some(Entity::Scenario(scenario)) = entity_from_node(EntityKind::Scenario, &node)
        else {
            panic!("expected a scenario");
        };
        assert_eq!(scenario.scenario_status, ScenarioStatus::Applied);
        assert_eq!(scenario.icon, ScenarioIcon::Lights);
        assert!(scenario.user_defined);
    }

    #[test]
    fn digital_input_defaults() {
        let node = json!({"act_id": 3, "name": "Doorbell"});
        let entity = entity_from_node(EntityKind::DigitalInput, &node).unwrap();
        assert_eq!(entity.status(), EntityStatus::NotApplicable);
        let Entity::DigitalInput(input) = entity else {
            panic!("expected a digital input");
        };
        assert_eq!(input.input_type, DigitalInputType::Button);
        assert_eq!(input.ack, 1);
        assert_eq!(input.radio_node_id, "00000000");
        assert_eq!(input.last_pressed, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn nodes_without_identifier_are_skipped() {
        let response = json!({
            "cmd_name": "light_list_resp",
            "sl_data_ack_reason": 0,
            "array": [
                {"act_id": 1, "name": "A"},
                {"name": "no id"},
                {"act_id": "x", "name": "bad id"},
                {"act_id": 2, "name": "B"}
            ]
        });
        let ids: Vec<_> = entities_from_response(EntityKind::Light, &response)
            .iter()
            .map(Entity::id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn list_key_is_accepted() {
        let response = json!({"list": [{"id": 4, "name": "Morning"}]});
        let entities = entities_from_response(EntityKind::Scenario, &response);
        assert_eq!(entities.len(), 1);
        assert!(entities_from_response(EntityKind::Scenario, &json!({})).is_empty());
    }

    #[test]
    fn feature_list_and_server_info() {
        let response = json!({
            "cmd_name": "feature_list_resp",
            "keycode": "0000FFFF",
            "swver": "1.2.3",
            "type": "0",
            "board": 3,
            "serial": "0011ffee",
            "list": ["lights", "openings", 5, "energy"],
            "sl_data_ack_reason": 0
        });
        let (features, info) = features_from_response(&response);
        let names: Vec<_> = features.iter().map(Feature::name).collect();
        assert_eq!(names, vec!["lights", "openings", "energy"]);
        assert_eq!(info.software_version, "1.2.3");
        assert_eq!(info.board, "3");
        assert_eq!(info.serial_number, "0011ffee");
    }
}
