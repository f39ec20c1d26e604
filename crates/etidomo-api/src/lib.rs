//! Async client for the CAME ETI/Domo command channel.
//!
//! Every exchange is a form-encoded `POST` of a JSON `command` against the
//! server's single `/domo/` endpoint. This crate covers the wire envelopes,
//! the session lifecycle (lazy login, keep-alive, logout) and the
//! serialized command dispatcher. Domain types and caching live in
//! `etidomo-core`.

pub mod dispatcher;
pub mod error;
pub mod session;
pub mod transport;
pub mod wire;

pub use dispatcher::{DispatchGuard, Dispatcher};
pub use error::Error;
pub use session::{Credentials, Session, SessionManager, session_expiry};
pub use transport::{Transport, TransportConfig};
pub use wire::AppCommand;
