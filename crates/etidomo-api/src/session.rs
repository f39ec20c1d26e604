// Session lifecycle
//
// Owns the credentials, the server-issued client id, the command sequence
// counter and the locally computed expiry. Login happens lazily: any
// authenticated exchange first calls `ensure_authenticated`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::transport::Transport;
use crate::wire::{self, ACK_SUCCESS, RegistrationAck};

/// Lower bound of the safety margin subtracted from the server timeout.
pub const EXPIRY_FLOOR: Duration = Duration::from_secs(30);

/// Login credentials. The password is only exposed while building the
/// registration envelope.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Client-side view of the server session.
///
/// Valid iff the token is non-empty and `expires_at` lies strictly in the
/// future. `sequence` is the last `cseq` handed out; it restarts at 0 on
/// every successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    expires_at: DateTime<Utc>,
    sequence: u64,
}

impl Session {
    /// An empty session that is never valid.
    pub fn unauthenticated() -> Self {
        Self {
            token: String::new(),
            expires_at: DateTime::<Utc>::MIN_UTC,
            sequence: 0,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && self.expires_at > now
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub(crate) fn establish(&mut self, token: String, expires_at: DateTime<Utc>) {
        self.token = token;
        self.expires_at = expires_at;
        self.sequence = 0;
    }

    pub(crate) fn extend(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = expires_at;
    }

    /// Advance the counter and return the number to put on the wire.
    pub(crate) fn reserve_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Give back a number that provably never reached the server.
    ///
    /// Only the most recent reservation can be released; anything else
    /// means a login happened in between and the counter already restarted.
    pub(crate) fn release_sequence(&mut self, cseq: u64) {
        if self.sequence == cseq && cseq > 0 {
            self.sequence -= 1;
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.token.clear();
        self.expires_at = DateTime::<Utc>::MIN_UTC;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

/// Compute when a freshly issued or extended session should be considered
/// expired.
///
/// The margin is `max(http_timeout, 30s)`, capped at half of the server
/// timeout so that short server timeouts still yield a usable window.
pub fn session_expiry(
    now: DateTime<Utc>,
    server_timeout: Duration,
    http_timeout: Duration,
) -> DateTime<Utc> {
    let margin = http_timeout.max(EXPIRY_FLOOR).min(server_timeout / 2);
    let usable = server_timeout.saturating_sub(margin);
    TimeDelta::from_std(usable)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Drives login, keep-alive and logout exchanges for one session.
#[derive(Debug)]
pub struct SessionManager {
    transport: Transport,
    credentials: Credentials,
    session: Session,
    server_timeout: Duration,
}

impl SessionManager {
    pub fn new(transport: Transport, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            session: Session::unauthenticated(),
            server_timeout: Duration::ZERO,
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Log in unless the held session is still valid.
    pub async fn ensure_authenticated(&mut self) -> Result<(), Error> {
        if self.session.is_valid() {
            debug!(
                expires_at = %self.session.expires_at(),
                "session still valid"
            );
            return Ok(());
        }
        self.login().await
    }

    /// Perform a registration exchange unconditionally.
    ///
    /// On failure the session is left unauthenticated and every error is
    /// reported as `Error::Authentication`.
    pub async fn login(&mut self) -> Result<(), Error> {
        self.session.invalidate();

        let request =
            wire::registration_request(&self.credentials.username, &self.credentials.password);
        let response = self
            .transport
            .post(&request)
            .await
            .map_err(|e| Error::Authentication {
                message: format!("login exchange failed: {e}"),
            })?;

        let ack = RegistrationAck::parse(&response).map_err(|e| match e {
            Error::Authentication { .. } => e,
            other => Error::Authentication {
                message: other.to_string(),
            },
        })?;

        self.server_timeout = Duration::from_secs(ack.keep_alive_timeout_secs);
        let expires_at =
            session_expiry(Utc::now(), self.server_timeout, self.transport.timeout());
        self.session.establish(ack.client_id, expires_at);

        info!(
            username = %self.credentials.username,
            %expires_at,
            "authenticated"
        );
        Ok(())
    }

    /// Best-effort liveness ping. Never fails; `false` means the session
    /// could not be confirmed and the next command will log in again.
    pub async fn keep_alive(&mut self) -> bool {
        match self.try_keep_alive().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "keep-alive failed");
                false
            }
        }
    }

    async fn try_keep_alive(&mut self) -> Result<(), Error> {
        self.ensure_authenticated().await?;

        let request = wire::keep_alive_request(self.session.token());
        let response = match self.transport.post(&request).await {
            Ok(response) => response,
            Err(Error::Http { status, .. }) if matches!(status, 401 | 403) => {
                self.session.invalidate();
                return Err(Error::SessionRejected { status });
            }
            Err(e) => return Err(e),
        };

        match wire::ack_reason(&response) {
            Some(ACK_SUCCESS) => {
                let expires_at =
                    session_expiry(Utc::now(), self.server_timeout, self.transport.timeout());
                self.session.extend(expires_at);
                debug!(%expires_at, "session extended");
                Ok(())
            }
            Some(reason) => Err(Error::BadAck {
                command: "sl_keep_alive_req".into(),
                reason,
            }),
            None => Err(Error::MissingField {
                command: "sl_keep_alive_req".into(),
                field: "sl_data_ack_reason",
            }),
        }
    }

    /// Best-effort server-side logout. Only a still-valid session is
    /// logged out on the server; the local session is invalidated whatever
    /// the outcome.
    pub async fn logout(&mut self) -> bool {
        if !self.session.is_valid() {
            debug!("no live session to log out");
            self.session.invalidate();
            return true;
        }

        let request = wire::logout_request(self.session.token());
        let outcome = self.transport.post(&request).await;
        self.session.invalidate();

        match outcome {
            Ok(response) => {
                let reason = wire::ack_reason(&response)
                    .or_else(|| wire::int_field(&response, "sl_ack_reason"));
                if reason == Some(ACK_SUCCESS) {
                    debug!("logged out");
                    true
                } else {
                    warn!(?reason, "logout not acknowledged");
                    false
                }
            }
            Err(e) => {
                warn!(error = %e, "logout failed");
                false
            }
        }
    }
}
