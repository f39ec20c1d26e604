//! Config subcommand handlers.

use etidomo_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init(init_args) => init(&init_args, global),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config()?;
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }

    let out = match global.format() {
        OutputFormat::Json => output::render_json(&cfg)?,
        OutputFormat::Yaml => output::render_yaml(&cfg)?,
        OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
            .map_err(|e| CliError::Internal(format!("TOML serialization failed: {e}")))?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn init(args: &InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let host = global.host.clone().ok_or_else(|| CliError::Validation {
        field: "host".into(),
        reason: "config init needs --host".into(),
    })?;
    let username = global.username.clone().ok_or_else(|| CliError::Validation {
        field: "username".into(),
        reason: "config init needs --username".into(),
    })?;
    let name = global.profile.clone().unwrap_or_else(|| "default".into());

    let mut cfg: Config = config::load_config()?;
    if cfg.profiles.contains_key(&name) && !args.force {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("profile '{name}' already exists (use --force to replace it)"),
        });
    }

    let mut profile = Profile::new(host, username);
    profile.password_env.clone_from(&args.password_env);
    profile.https = global.https;
    profile.probe = !global.no_probe;
    profile.timeout = global.timeout;
    cfg.profiles.insert(name.clone(), profile);

    if args.set_default || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(name.clone());
    }

    let path = config::save_config(&cfg)?;
    if !global.quiet {
        eprintln!("Profile '{name}' written to {}", path.display());
    }
    Ok(())
}
