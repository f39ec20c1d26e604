//! Entity listing.

use std::sync::Arc;

use tabled::Tabled;

use etidomo_core::{Client, Entity, EntityKind, LightType};

use crate::cli::{EntitiesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&Arc<Entity>> for EntityRow {
    fn from(e: &Arc<Entity>) -> Self {
        Self {
            kind: e.kind().to_string(),
            id: e.id(),
            name: e.name().to_owned(),
            status: e.status().to_string(),
            details: details(e),
        }
    }
}

fn details(entity: &Entity) -> String {
    match entity {
        Entity::Light(l) if l.light_type == LightType::Dimmable => {
            format!("{} {}%", l.light_type, l.brightness)
        }
        Entity::Light(l) => l.light_type.to_string(),
        Entity::Opening(o) if o.partial.is_empty() => format!("close id {}", o.close_id),
        Entity::Opening(o) => format!("close id {}, partial {:?}", o.close_id, o.partial),
        Entity::Scenario(s) => s.scenario_status.to_string(),
        Entity::DigitalInput(d) => format!(
            "{} @{}, last {}",
            d.input_type,
            d.address,
            d.last_pressed.format("%Y-%m-%d %H:%M:%S")
        ),
    }
}

fn detail_view(entity: &Arc<Entity>) -> String {
    let row = EntityRow::from(entity);
    [
        format!("Kind:     {}", row.kind),
        format!("ID:       {}", row.id),
        format!("Name:     {}", row.name),
        format!("Status:   {}", row.status),
        format!("Details:  {}", row.details),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &Client,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = args.kind.map(EntityKind::from);

    let entities = match kind {
        Some(kind) if args.refresh => client.refresh_entities(kind).await?,
        _ => client.get_entities(kind).await?,
    };

    let out = match (kind, args.id) {
        (Some(kind), Some(id)) => {
            let entity = entities
                .iter()
                .find(|e| e.id() == id)
                .ok_or_else(|| CliError::NotFound {
                    kind: kind.to_string(),
                    id,
                })?;
            output::render_single(global.format(), entity, detail_view)?
        }
        _ => output::render_list(
            global.format(),
            &entities,
            |e| EntityRow::from(e),
            |e| format!("{}/{}", e.kind(), e.id()),
        )?,
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
