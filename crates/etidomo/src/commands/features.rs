//! Feature list and server identification.

use std::sync::Arc;

use tabled::Tabled;

use etidomo_core::{Client, Feature, ServerInfo};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: String,
    #[tabled(rename = "Entities")]
    kind: String,
}

impl From<&Arc<Feature>> for FeatureRow {
    fn from(f: &Arc<Feature>) -> Self {
        Self {
            name: f.name().to_owned(),
            kind: f
                .entity_kind()
                .map_or_else(|| "-".to_owned(), |k| k.to_string()),
        }
    }
}

pub async fn features(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let features = client.get_features().await?;
    let out = output::render_list(
        global.format(),
        &features,
        |f| FeatureRow::from(f),
        |f| f.name().to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(info: &Arc<ServerInfo>) -> String {
    [
        format!("Keycode:   {}", info.keycode),
        format!("Software:  {}", info.software_version),
        format!("Type:      {}", info.server_type),
        format!("Board:     {}", info.board),
        format!("Serial:    {}", info.serial_number),
    ]
    .join("\n")
}

pub async fn info(client: &Client, global: &GlobalOpts) -> Result<(), CliError> {
    let info = client.server_info().await?;
    let out = output::render_single(global.format(), &info, detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
