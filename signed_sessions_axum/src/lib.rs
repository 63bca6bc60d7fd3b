//! signed_sessions_axum - Axum integration for signed client-side sessions
//!
//! Wires the `signed_sessions` core into the axum request/response cycle:
//! a middleware verifies the inbound session cookie, hands the session to
//! handlers through request extensions, and signs the outbound session
//! back into a `Set-Cookie` header after the handler succeeds.

mod config;
mod middleware;
mod session;


pub use config::{CookieAttributes, SameSite};
pub use middleware::{SignedSessions, signed_session};
pub use session::{RequestSession, ResponseSession, SessionLayerMissing};

// Re-export the core types callers configure and handle
pub use signed_sessions::{
    AuthenticityError, Session, SessionConfig, SessionError, SessionManager, Signer,
};
