// Command dispatcher
//
// Serializes every exchange on a session behind one async mutex, attaches
// the client id and the next `cseq`, and classifies failures. Callers that
// need to pair an exchange with a cache update hold the `DispatchGuard`
// across both.

use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::Error;
use crate::session::{Session, SessionManager};
use crate::wire::{self, AppCommand};

/// Single serialization scope for one client session.
#[derive(Debug)]
pub struct Dispatcher {
    manager: Mutex<SessionManager>,
}

impl Dispatcher {
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager: Mutex::new(manager),
        }
    }

    /// Acquire exclusive use of the session.
    pub async fn lock(&self) -> DispatchGuard<'_> {
        DispatchGuard {
            manager: self.manager.lock().await,
        }
    }

    /// Run one authenticated command.
    pub async fn execute(&self, command: &AppCommand) -> Result<Value, Error> {
        self.lock().await.execute(command).await
    }
}

/// Exclusive access to the session for the lifetime of the guard.
pub struct DispatchGuard<'a> {
    manager: MutexGuard<'a, SessionManager>,
}

impl DispatchGuard<'_> {
    pub fn session(&self) -> &Session {
        self.manager.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.manager.is_authenticated()
    }

    pub async fn ensure_authenticated(&mut self) -> Result<(), Error> {
        self.manager.ensure_authenticated().await
    }

    pub async fn keep_alive(&mut self) -> bool {
        self.manager.keep_alive().await
    }

    pub async fn logout(&mut self) -> bool {
        self.manager.logout().await
    }

    /// Run one authenticated command.
    ///
    /// If the server rejects the session with 401/403, idempotent commands
    /// are replayed once after a fresh login. Actions are never replayed.
    pub async fn execute(&mut self, command: &AppCommand) -> Result<Value, Error> {
        match self.execute_once(command).await {
            Err(e) if e.is_auth_expired() && command.is_idempotent() => {
                debug!(command = command.name(), "session rejected, retrying once");
                self.execute_once(command).await
            }
            other => other,
        }
    }

    async fn execute_once(&mut self, command: &AppCommand) -> Result<Value, Error> {
        self.manager.ensure_authenticated().await?;

        let session = self.manager.session_mut();
        let cseq = session.reserve_sequence();
        let request = wire::data_request(session.token(), cseq, command);
        debug!(command = command.name(), cseq, "dispatching");

        match self.manager.transport().post(&request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                if e.is_undelivered() {
                    debug!(cseq, "request never left the client, releasing cseq");
                    self.manager.session_mut().release_sequence(cseq);
                }
                match e {
                    Error::Http { status, .. } if matches!(status, 401 | 403) => {
                        self.manager.session_mut().invalidate();
                        Err(Error::SessionRejected { status })
                    }
                    other => Err(other),
                }
            }
        }
    }
}
