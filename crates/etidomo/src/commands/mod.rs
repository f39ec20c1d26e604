//! Command dispatch: CLI args -> client calls -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod entities;
pub mod features;

use etidomo_core::Client;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to its handler.
pub async fn dispatch(cmd: Command, client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Features => features::features(client, global).await,
        Command::Info => features::info(client, global).await,
        Command::Entities(args) => entities::handle(client, args, global).await,
        Command::Light(args) => control::light(client, args, global).await,
        Command::Opening(args) => control::opening(client, args, global).await,
        Command::Scenario(args) => control::scenario(client, args, global).await,
        Command::KeepAlive => control::keep_alive(client, global).await,
        // handled before a client is built
        Command::Config(_) => Err(CliError::Internal(
            "config commands do not use a server connection".into(),
        )),
    }
}
