//! Status changes and session liveness.

use etidomo_core::{Client, EntityKind, EntityStatus, StatusOptions};

use crate::cli::{GlobalOpts, LightArgs, OpeningArgs, ScenarioArgs};
use crate::error::CliError;

async fn apply(
    client: &Client,
    kind: EntityKind,
    id: i64,
    status: EntityStatus,
    options: StatusOptions,
    action: String,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !client.set_entity_status(kind, id, status, options).await? {
        return Err(CliError::Refused { action });
    }
    if !global.quiet {
        eprintln!("Done: {action}");
    }
    Ok(())
}

pub async fn light(client: &Client, args: LightArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let options = StatusOptions {
        brightness: args.brightness,
    };
    let action = format!("switch light {} {}", args.id, args.state.label());
    apply(
        client,
        EntityKind::Light,
        args.id,
        args.state.into(),
        options,
        action,
        global,
    )
    .await
}

pub async fn opening(
    client: &Client,
    args: OpeningArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let action = format!("{} opening {}", args.action.label(), args.id);
    apply(
        client,
        EntityKind::Opening,
        args.id,
        args.action.into(),
        StatusOptions::default(),
        action,
        global,
    )
    .await
}

pub async fn scenario(
    client: &Client,
    args: ScenarioArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    apply(
        client,
        EntityKind::Scenario,
        args.id,
        EntityStatus::OnOpenTriggered,
        StatusOptions::default(),
        format!("activate scenario {}", args.id),
        global,
    )
    .await
}

pub async fn keep_alive(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    if !client.keep_alive().await {
        return Err(CliError::Refused {
            action: "keep the session alive".into(),
        });
    }
    if !global.quiet {
        println!("alive");
    }
    Ok(())
}
