// Command transport
//
// One form-encoded POST per exchange against the server's single
// `/domo/` endpoint. The JSON command travels in the `command` form field;
// the answer is a JSON object. No retries happen here.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

const USER_AGENT: &str = concat!("etidomo/", env!("CARGO_PKG_VERSION"));

/// Settings used to build the underlying `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Fixed per-request timeout.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Raw HTTP channel to one ETI/Domo server.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl Transport {
    /// Create a transport for `endpoint` (e.g. `http://192.168.1.3/domo/`).
    pub fn new(endpoint: Url, config: &TransportConfig) -> Result<Self, Error> {
        let http = config.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout: config.timeout,
        })
    }

    /// Create a transport around a pre-built `reqwest::Client`.
    ///
    /// `timeout` is only used for error reporting; the client's own
    /// timeout is what bounds each request.
    pub fn with_client(http: reqwest::Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            timeout,
        }
    }

    /// The endpoint every exchange is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The fixed per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check that the endpoint answers a plain GET with a 2xx status.
    pub async fn probe(&self) -> Result<(), Error> {
        debug!("GET {}", self.endpoint);

        let unreachable = |reason: String| Error::Unreachable {
            url: self.endpoint.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(self.endpoint.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(unreachable(format!("HTTP {status}")))
        }
    }

    /// Send one command and decode the JSON answer.
    ///
    /// Non-2xx statuses become `Error::Http`, an empty body becomes
    /// `Error::EmptyResponse`, and an undecodable one `Error::Deserialization`.
    pub async fn post(&self, command: &Value) -> Result<Value, Error> {
        debug!("POST {}", self.endpoint);
        let encoded = command.to_string();
        trace!(command = %redact(command), "sending command");

        let resp = self
            .http
            .post(self.endpoint.clone())
            .form(&[("command", encoded.as_str())])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        if body.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}

/// Copy of `command` with the login password masked, for trace output.
fn redact(command: &Value) -> Value {
    let mut copy = command.clone();
    if let Some(pwd) = copy.get_mut("sl_pwd") {
        *pwd = Value::String("***".into());
    }
    copy
}
