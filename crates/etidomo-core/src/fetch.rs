// ── Command builders for fetchers and status changes ──

use etidomo_api::AppCommand;
use etidomo_api::wire::{ACK_SUCCESS, ack_reason};
use serde_json::Value;

use crate::model::{EntityId, EntityKind, EntityStatus};

pub const FEATURE_LIST: &str = "feature_list_req";

pub fn features_command() -> AppCommand {
    AppCommand::query(FEATURE_LIST)
}

/// List request for one entity kind.
pub fn list_command(kind: EntityKind) -> AppCommand {
    match kind {
        EntityKind::Light => AppCommand::query("light_list_req")
            .with("topologic_scope", "plant")
            .with("value", 0),
        EntityKind::Opening => AppCommand::query("openings_list_req"),
        EntityKind::Scenario => AppCommand::query("scenarios_list_req"),
        EntityKind::DigitalInput => AppCommand::query("digitalin_list_req"),
    }
}

/// Status change request, or `None` for kinds that cannot be switched and
/// statuses with no wire code.
///
/// `brightness` must already be clamped; it is only sent for lights.
pub fn status_command(
    kind: EntityKind,
    id: EntityId,
    status: EntityStatus,
    brightness: u8,
) -> Option<AppCommand> {
    match kind {
        EntityKind::Light => Some(
            AppCommand::action("light_switch_req")
                .with("act_id", id)
                .with("wanted_status", status.code()?)
                .with("perc", brightness),
        ),
        EntityKind::Opening => Some(
            AppCommand::action("opening_move_req")
                .with("act_id", id)
                .with("wanted_status", status.code()?),
        ),
        // activation takes no wanted status
        EntityKind::Scenario => Some(AppCommand::action("scenario_activation_req").with("id", id)),
        EntityKind::DigitalInput => None,
    }
}

/// Fail with `BadAck` unless the response carries reason 0.
pub fn check_ack(command: &AppCommand, response: &Value) -> Result<(), etidomo_api::Error> {
    match ack_reason(response) {
        Some(ACK_SUCCESS) => Ok(()),
        Some(reason) => Err(etidomo_api::Error::BadAck {
            command: command.name().to_owned(),
            reason,
        }),
        None => Err(etidomo_api::Error::MissingField {
            command: command.name().to_owned(),
            field: "sl_data_ack_reason",
        }),
    }
}
