// ── Core error types ──
//
// Caller-facing errors from etidomo-core. Raw transport and decoding
// failures never reach consumers; the `From<etidomo_api::Error>` impl
// folds them into one of five kinds.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid client construction input.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The reachability probe at construction failed.
    #[error("Cannot reach ETI/Domo server at {url}: {reason}")]
    ServerUnreachable { url: String, reason: String },

    /// Login failed or was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An authenticated exchange failed at transport or protocol level.
    #[error("Request failed: {message}")]
    Request {
        message: String,
        /// HTTP status code, if the server answered at all.
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<etidomo_api::Error> for CoreError {
    fn from(err: etidomo_api::Error) -> Self {
        use etidomo_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::Authentication { message },
            Api::Unreachable { url, reason } => CoreError::ServerUnreachable { url, reason },
            Api::InvalidUrl(e) => CoreError::Configuration {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => CoreError::Configuration {
                message: format!("HTTP client setup failed: {msg}"),
            },
            other => CoreError::Request {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_become_request_errors() {
        let err: CoreError = etidomo_api::Error::Http {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(
            err,
            CoreError::Request {
                status: Some(500),
                ..
            }
        ));

        let err: CoreError = etidomo_api::Error::EmptyResponse.into();
        assert!(matches!(err, CoreError::Request { status: None, .. }));
    }

    #[test]
    fn login_failures_stay_authentication_errors() {
        let err: CoreError = etidomo_api::Error::Authentication {
            message: "reason 1".into(),
        }
        .into();
        assert!(err.is_authentication());
    }

    #[test]
    fn probe_failure_is_unreachable() {
        let err: CoreError = etidomo_api::Error::Unreachable {
            url: "http://10.0.0.2/domo/".into(),
            reason: "HTTP 404".into(),
        }
        .into();
        assert!(matches!(err, CoreError::ServerUnreachable { .. }));
    }
}
