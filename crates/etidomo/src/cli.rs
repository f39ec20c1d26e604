//! Clap derive structures for the `etidomo` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use etidomo_core::{EntityKind, EntityStatus};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// etidomo -- query and drive a CAME ETI/Domo home-automation server
#[derive(Debug, Parser)]
#[command(
    name = "etidomo",
    version,
    about = "Control CAME ETI/Domo home automation from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "ETIDOMO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server host, optionally with a port (overrides profile)
    #[arg(long, env = "ETIDOMO_HOST", global = true)]
    pub host: Option<String>,

    /// Login name (overrides profile)
    #[arg(long, short = 'u', env = "ETIDOMO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Talk to the server over HTTPS
    #[arg(long, global = true)]
    pub https: bool,

    /// Skip the reachability probe before login
    #[arg(long, global = true)]
    pub no_probe: bool,

    /// Request timeout in seconds (overrides profile and defaults)
    #[arg(long, env = "ETIDOMO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format (defaults to `defaults.output` from the config file)
    #[arg(long, short = 'o', env = "ETIDOMO_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    /// The format picked by `-o`, or the table view.
    pub fn format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List features advertised by the server
    Features,

    /// Show server identification (keycode, firmware, serial)
    Info,

    /// List lights, openings, scenarios and digital inputs
    #[command(alias = "ls")]
    Entities(EntitiesArgs),

    /// Switch a light on or off
    Light(LightArgs),

    /// Open, close or stop an opening
    Opening(OpeningArgs),

    /// Activate a scenario
    Scenario(ScenarioArgs),

    /// Send a keep-alive and report whether the session is alive
    KeepAlive,

    /// Inspect and create configuration profiles
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Light,
    Opening,
    Scenario,
    DigitalInput,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Light => EntityKind::Light,
            KindArg::Opening => EntityKind::Opening,
            KindArg::Scenario => EntityKind::Scenario,
            KindArg::DigitalInput => EntityKind::DigitalInput,
        }
    }
}

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    /// Only this kind of entity
    #[arg(long, short = 'k')]
    pub kind: Option<KindArg>,

    /// Show a single entity (requires --kind)
    #[arg(long, requires = "kind")]
    pub id: Option<i64>,

    /// Re-fetch from the server instead of using what was fetched earlier
    #[arg(long, requires = "kind")]
    pub refresh: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwitchArg {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct LightArgs {
    /// Light actuator id
    pub id: i64,

    pub state: SwitchArg,

    /// Brightness in percent for dimmable lights (clamped to 0-100)
    #[arg(long, short = 'b', allow_negative_numbers = true)]
    pub brightness: Option<i64>,
}

impl SwitchArg {
    pub fn label(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl From<SwitchArg> for EntityStatus {
    fn from(state: SwitchArg) -> Self {
        match state {
            SwitchArg::On => EntityStatus::OnOpenTriggered,
            SwitchArg::Off => EntityStatus::OffStopped,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MoveArg {
    Open,
    Close,
    Stop,
}

impl MoveArg {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Stop => "stop",
        }
    }
}

impl From<MoveArg> for EntityStatus {
    fn from(action: MoveArg) -> Self {
        match action {
            MoveArg::Open => EntityStatus::OnOpenTriggered,
            MoveArg::Close => EntityStatus::Closed,
            MoveArg::Stop => EntityStatus::OffStopped,
        }
    }
}

#[derive(Debug, Args)]
pub struct OpeningArgs {
    /// Opening actuator id (the "open" actuator)
    pub id: i64,

    pub action: MoveArg,
}

#[derive(Debug, Args)]
pub struct ScenarioArgs {
    /// Scenario id
    pub id: i64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the loaded configuration (passwords masked)
    Show,

    /// Print the config file path
    Path,

    /// Write a profile from --host / --username (profile name from -p)
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Environment variable the password is read from
    #[arg(long)]
    pub password_env: Option<String>,

    /// Make this profile the default
    #[arg(long)]
    pub set_default: bool,

    /// Replace an existing profile of the same name
    #[arg(long)]
    pub force: bool,
}
