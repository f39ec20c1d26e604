//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and a stable exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use etidomo_config::ConfigError;
use etidomo_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFIG: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach ETI/Domo server at {url}")]
    #[diagnostic(
        code(etidomo::unreachable),
        help(
            "{reason}\n\
             Check the host and port, or pass --https if the server requires it."
        )
    )]
    Unreachable { url: String, reason: String },

    #[error("Request failed: {message}")]
    #[diagnostic(code(etidomo::request_failed))]
    Request { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(etidomo::auth_failed),
        help("Verify the username and password configured for this profile.")
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(etidomo::no_credentials),
        help("Set ETIDOMO_PASSWORD, or add password_env to the profile.")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{kind} {id} not found")]
    #[diagnostic(
        code(etidomo::not_found),
        help("Run: etidomo entities --kind {kind}")
    )]
    NotFound { kind: String, id: i64 },

    #[error("Server refused to {action}")]
    #[diagnostic(code(etidomo::refused), help("Run with -v to see the server's reason."))]
    Refused { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(etidomo::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(etidomo::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: etidomo config init --host <HOST> --username <USER>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(etidomo::no_config),
        help(
            "Pass --host and --username, or create a profile with: etidomo config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{0}")]
    #[diagnostic(code(etidomo::config))]
    Config(String),

    // ── Other ────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    #[diagnostic(code(etidomo::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::Request { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Refused { .. } | Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration { message } => CliError::Validation {
                field: "connection settings".into(),
                reason: message,
            },
            CoreError::ServerUnreachable { url, reason } => CliError::Unreachable { url, reason },
            CoreError::Authentication { message } => CliError::AuthFailed { message },
            CoreError::Request { message, .. } => CliError::Request { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}
