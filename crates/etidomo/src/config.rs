//! Flag-aware resolution of the connection settings.
//!
//! Core never sees profiles; it receives a finished `ClientConfig`.

use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;

use etidomo_config::{Config, Profile, config_path, profile_to_client_config};
use etidomo_core::{ClientConfig, Scheme};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Build a `ClientConfig` from the config file, the active profile and
/// flag overrides. Without a matching profile, `--host` and `--username`
/// must be given and the password comes from `ETIDOMO_PASSWORD`.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = etidomo_config::load_config()?;
    resolve(&cfg, global)
}

/// `-o` wins; otherwise `defaults.output` from the config file. An
/// unreadable file falls back to the table view and is reported later by
/// whichever command needs the file.
pub fn resolve_output(global: &GlobalOpts) -> OutputFormat {
    if let Some(format) = &global.output {
        return format.clone();
    }
    etidomo_config::load_config()
        .map(|cfg| configured_output(&cfg))
        .unwrap_or(OutputFormat::Table)
}

fn configured_output(cfg: &Config) -> OutputFormat {
    OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
        warn!(output = %cfg.defaults.output, "unknown defaults.output, using table");
        OutputFormat::Table
    })
}

fn resolve(cfg: &Config, global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // an explicitly named profile must exist
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: cfg.profile_names(),
                name: profile_name,
            });
        }
        None => ad_hoc_profile(global)?,
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }

    let mut config = profile_to_client_config(&profile, &profile_name, &cfg.defaults)?;
    if global.https {
        config.scheme = Scheme::Https;
    }
    if global.no_probe {
        config.probe = false;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

fn ad_hoc_profile(global: &GlobalOpts) -> Result<Profile, CliError> {
    let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let username = global
        .username
        .as_deref()
        .ok_or_else(|| CliError::Validation {
            field: "username".into(),
            reason: "--username is required when no profile is configured".into(),
        })?;
    Ok(Profile::new(host, username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["etidomo"];
        argv.extend_from_slice(args);
        argv.push("features");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_home() -> Config {
        let mut profile = Profile::new("10.0.0.2", "admin");
        profile.password = Some("pw".into());
        profile.timeout = Some(3);

        let mut cfg = Config::default();
        cfg.default_profile = Some("home".into());
        cfg.profiles.insert("home".into(), profile);
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_home();
        let config = resolve(
            &cfg,
            &global(&["--host", "10.0.0.9:8080", "--https", "--timeout", "20", "--no-probe"]),
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.9:8080");
        assert_eq!(config.username, "admin");
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert!(!config.probe);
    }

    #[test]
    fn default_profile_is_used_without_flags() {
        let config = resolve(&config_with_home(), &global(&[])).unwrap();
        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.probe);
    }

    #[test]
    fn explicit_missing_profile_fails() {
        let err = resolve(&config_with_home(), &global(&["-p", "cabin"])).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "home"));
    }

    #[test]
    fn no_profile_and_no_host_is_no_config() {
        let err = resolve(&Config::default(), &global(&[])).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }

    #[test]
    fn configured_output_is_case_insensitive() {
        let mut cfg = Config::default();
        assert_eq!(configured_output(&cfg), OutputFormat::Table);

        cfg.defaults.output = "JSON".into();
        assert_eq!(configured_output(&cfg), OutputFormat::Json);

        cfg.defaults.output = "xml".into();
        assert_eq!(configured_output(&cfg), OutputFormat::Table);
    }

    #[test]
    fn output_flag_is_optional() {
        assert_eq!(global(&[]).output, None);
        assert_eq!(global(&["-o", "yaml"]).output, Some(OutputFormat::Yaml));
    }

    #[test]
    fn ad_hoc_host_requires_username() {
        let err = resolve(&Config::default(), &global(&["--host", "10.0.0.2"])).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "username"));
    }
}
