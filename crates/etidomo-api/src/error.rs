use thiserror::Error;

/// Top-level error type for the `etidomo-api` crate.
///
/// Covers every failure mode of the command channel: login, transport,
/// envelope decoding and protocol acknowledgments. `etidomo-core` maps
/// these into the caller-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, non-zero ack, missing token, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The server answered an authenticated exchange with 401/403.
    #[error("Session rejected by server (HTTP {status})")]
    SessionRejected { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// Reachability probe failed.
    #[error("Server unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Non-2xx HTTP status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// 2xx status with an empty body.
    #[error("Server returned an empty response")]
    EmptyResponse,

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The server acknowledged a command with a non-zero reason code.
    #[error("Command {command} rejected with reason code {reason}")]
    BadAck { command: String, reason: i64 },

    /// A required field is absent from a response.
    #[error("Response to {command} is missing `{field}`")]
    MissingField { command: String, field: &'static str },
}

impl Error {
    /// Returns `true` if this error indicates the session is gone
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionRejected { .. })
    }

    /// Returns `true` when the request provably never left the client,
    /// so the sequence number it carried was not seen by the server.
    pub fn is_undelivered(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_builder(),
            Self::InvalidUrl(_) | Self::Tls(_) => true,
            _ => false,
        }
    }

    /// HTTP status attached to the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::SessionRejected { status } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
