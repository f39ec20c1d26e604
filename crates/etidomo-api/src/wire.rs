// Wire envelopes
//
// Builders for the four top-level request shapes (registration, data,
// keep-alive, logout) and helpers for reading acknowledgment fields.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};

use crate::error::Error;

/// Reason code signalling success in every acknowledgment.
pub const ACK_SUCCESS: i64 = 0;

/// Application message type carried by every data request.
pub const APPL_MSG_TYPE: &str = "domo";

/// Client identifier placed in `sl_appl_msg.client`.
pub const APPL_CLIENT: &str = "eti_domo_client";

/// A logical application command: `cmd_name` plus its type-specific fields.
///
/// Idempotent commands (list queries) may be replayed after a session
/// renewal; actions that move hardware never are.
#[derive(Debug, Clone, PartialEq)]
pub struct AppCommand {
    name: String,
    fields: Map<String, Value>,
    idempotent: bool,
}

impl AppCommand {
    /// A read-only query, safe to replay.
    pub fn query(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
            idempotent: true,
        }
    }

    /// A command with physical side effects, never replayed.
    pub fn action(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Map::new(),
            idempotent: false,
        }
    }

    /// Attach a type-specific field.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_idempotent(&self) -> bool {
        self.idempotent
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// `sl_registration_req`: exchange credentials for a client id.
pub fn registration_request(username: &str, password: &SecretString) -> Value {
    json!({
        "sl_cmd": "sl_registration_req",
        "sl_login": username,
        "sl_pwd": password.expose_secret(),
    })
}

/// `sl_keep_alive_req`: extend the session.
pub fn keep_alive_request(client_id: &str) -> Value {
    json!({
        "sl_client_id": client_id,
        "sl_cmd": "sl_keep_alive_req",
    })
}

/// `sl_logout_req`: end the session server-side.
pub fn logout_request(client_id: &str) -> Value {
    json!({
        "sl_client_id": client_id,
        "sl_cmd": "sl_logout_req",
    })
}

/// `sl_data_req`: wrap an application command with the session id and `cseq`.
pub fn data_request(client_id: &str, cseq: u64, command: &AppCommand) -> Value {
    let mut appl = Map::with_capacity(command.fields.len() + 3);
    appl.insert("client".into(), APPL_CLIENT.into());
    appl.insert("cmd_name".into(), command.name.clone().into());
    appl.insert("cseq".into(), cseq.into());
    for (key, value) in &command.fields {
        appl.insert(key.clone(), value.clone());
    }

    json!({
        "sl_appl_msg": Value::Object(appl),
        "sl_appl_msg_type": APPL_MSG_TYPE,
        "sl_client_id": client_id,
        "sl_cmd": "sl_data_req",
    })
}

/// Read an integer reason code, tolerating numbers encoded as strings.
pub fn int_field(response: &Value, field: &str) -> Option<i64> {
    match response.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The `sl_data_ack_reason` of a response, if present.
pub fn ack_reason(response: &Value) -> Option<i64> {
    int_field(response, "sl_data_ack_reason")
}

/// Decoded `sl_registration_ack`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationAck {
    pub client_id: String,
    pub keep_alive_timeout_secs: u64,
}

impl RegistrationAck {
    /// Validate a registration answer.
    ///
    /// An answer that is not `sl_registration_ack`, a non-zero reason, an
    /// empty client id or a missing/zero keep-alive timeout all count as a
    /// failed login.
    pub fn parse(response: &Value) -> Result<Self, Error> {
        let cmd = response.get("sl_cmd").and_then(Value::as_str);
        if cmd != Some("sl_registration_ack") {
            return Err(Error::Authentication {
                message: format!(
                    "unexpected answer to login: {}",
                    cmd.unwrap_or("no sl_cmd")
                ),
            });
        }

        let reason = ack_reason(response).ok_or_else(|| Error::MissingField {
            command: "sl_registration_req".into(),
            field: "sl_data_ack_reason",
        })?;
        if reason != ACK_SUCCESS {
            return Err(Error::Authentication {
                message: format!("server rejected credentials (reason {reason})"),
            });
        }

        let client_id = response
            .get("sl_client_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::MissingField {
                command: "sl_registration_req".into(),
                field: "sl_client_id",
            })?
            .to_owned();

        let keep_alive_timeout_secs = int_field(response, "sl_keep_alive_timeout_sec")
            .and_then(|t| u64::try_from(t).ok())
            .filter(|t| *t > 0)
            .ok_or_else(|| Error::MissingField {
                command: "sl_registration_req".into(),
                field: "sl_keep_alive_timeout_sec",
            })?;

        Ok(Self {
            client_id,
            keep_alive_timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_request_nests_the_application_message() {
        let cmd = AppCommand::query("light_list_req")
            .with("topologic_scope", "plant")
            .with("value", 0);
        let envelope = data_request("abc", 4, &cmd);

        assert_eq!(envelope["sl_cmd"], "sl_data_req");
        assert_eq!(envelope["sl_client_id"], "abc");
        assert_eq!(envelope["sl_appl_msg_type"], "domo");
        assert_eq!(envelope["sl_appl_msg"]["cmd_name"], "light_list_req");
        assert_eq!(envelope["sl_appl_msg"]["cseq"], 4);
        assert_eq!(envelope["sl_appl_msg"]["topologic_scope"], "plant");
        assert_eq!(envelope["sl_appl_msg"]["client"], APPL_CLIENT);
    }

    #[test]
    fn registration_request_exposes_password_only_in_envelope() {
        let pwd = SecretString::from("s3cret");
        let envelope = registration_request("admin", &pwd);
        assert_eq!(envelope["sl_pwd"], "s3cret");
        assert_eq!(envelope["sl_login"], "admin");
        assert!(envelope.get("sl_client_id").is_none());
    }

    #[test]
    fn registration_ack_accepts_success() {
        let ack = RegistrationAck::parse(&json!({
            "sl_cmd": "sl_registration_ack",
            "sl_client_id": "75c6c33a",
            "sl_keep_alive_timeout_sec": 900,
            "sl_data_ack_reason": 0,
        }))
        .unwrap();
        assert_eq!(ack.client_id, "75c6c33a");
        assert_eq!(ack.keep_alive_timeout_secs, 900);
    }

    #[test]
    fn registration_ack_rejects_non_zero_reason() {
        let err = RegistrationAck::parse(&json!({
            "sl_cmd": "sl_registration_ack",
            "sl_client_id": "75c6c33a",
            "sl_keep_alive_timeout_sec": 900,
            "sl_data_ack_reason": 1,
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[test]
    fn registration_ack_rejects_other_commands() {
        let wrong_cmd = RegistrationAck::parse(&json!({
            "sl_cmd": "sl_data_ack",
            "sl_client_id": "75c6c33a",
            "sl_keep_alive_timeout_sec": 900,
            "sl_data_ack_reason": 0,
        }));
        assert!(matches!(wrong_cmd, Err(Error::Authentication { .. })));

        let no_cmd = RegistrationAck::parse(&json!({
            "sl_client_id": "75c6c33a",
            "sl_keep_alive_timeout_sec": 900,
            "sl_data_ack_reason": 0,
        }));
        assert!(matches!(no_cmd, Err(Error::Authentication { .. })));
    }

    #[test]
    fn registration_ack_requires_token_and_timeout() {
        let no_token = RegistrationAck::parse(&json!({
            "sl_cmd": "sl_registration_ack",
            "sl_client_id": "",
            "sl_keep_alive_timeout_sec": 900,
            "sl_data_ack_reason": 0,
        }));
        assert!(matches!(
            no_token,
            Err(Error::MissingField {
                field: "sl_client_id",
                ..
            })
        ));

        let zero_timeout = RegistrationAck::parse(&json!({
            "sl_cmd": "sl_registration_ack",
            "sl_client_id": "abc",
            "sl_keep_alive_timeout_sec": 0,
            "sl_data_ack_reason": 0,
        }));
        assert!(matches!(
            zero_timeout,
            Err(Error::MissingField {
                field: "sl_keep_alive_timeout_sec",
                ..
            })
        ));
    }

    #[test]
    fn int_field_reads_numeric_strings() {
        let v = json!({"a": "7", "b": 3, "c": null});
        assert_eq!(int_field(&v, "a"), Some(7));
        assert_eq!(int_field(&v, "b"), Some(3));
        assert_eq!(int_field(&v, "c"), None);
        assert_eq!(int_field(&v, "d"), None);
    }
}
