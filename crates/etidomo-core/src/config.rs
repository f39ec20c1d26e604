// ── Runtime connection configuration ──
//
// Describes how to reach one ETI/Domo server. Carries credentials but never
// touches disk; the CLI builds a `ClientConfig` and hands it in.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// Configuration for connecting to a single server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name or address, optionally with a port (e.g. `192.168.1.3`).
    pub host: String,
    pub username: String,
    pub password: SecretString,
    /// Fixed timeout applied to every HTTP exchange.
    pub timeout: Duration,
    pub scheme: Scheme,
    /// Probe the endpoint with a GET before the first login.
    pub probe: bool,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            scheme: Scheme::Http,
            probe: true,
        }
    }

    /// Reject empty host, username or password.
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing = if self.host.trim().is_empty() {
            Some("host")
        } else if self.username.trim().is_empty() {
            Some("username")
        } else if self.password.expose_secret().is_empty() {
            Some("password")
        } else {
            None
        };

        match missing {
            Some(field) => Err(CoreError::Configuration {
                message: format!("{field} cannot be empty"),
            }),
            None => Ok(()),
        }
    }

    /// `{scheme}://{host}/domo/`
    pub fn endpoint(&self) -> Result<Url, CoreError> {
        let host = self.host.trim().trim_end_matches('/');
        Url::parse(&format!("{}://{host}/domo/", self.scheme)).map_err(|e| {
            CoreError::Configuration {
                message: format!("invalid host {host:?}: {e}"),
            }
        })
    }
}
