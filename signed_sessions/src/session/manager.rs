//! Session lifecycle for one request/response exchange.

use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::Session;
use crate::signer::Signer;

/// The two session mappings for a single exchange.
///
/// `request` is the read view of what the client presented; `response` is
/// the mutable mapping that gets signed back. They start as deep copies of
/// each other and never alias afterwards.
#[derive(Debug, Clone, Default)]
pub struct SessionPair {
    pub request: Session,
    pub response: Session,
}

/// Bridges the signer to the request/response lifecycle.
///
/// Owns the signer and the configured cookie name, and nothing else: it is
/// a pure per-request transformer, safe to share across concurrent
/// requests behind an `Arc` since nothing mutates after construction.
pub struct SessionManager {
    signer: Signer,
    cookie_name: String,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            signer: Signer::new(config)?,
            cookie_name: config.cookie_name.clone(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Establish the session mappings for an inbound request.
    ///
    /// Fail-closed: an absent cookie, a corrupted token, or one signed
    /// under different secret material all yield empty mappings and the
    /// request proceeds anonymously. Verification failure is never
    /// surfaced to the caller.
    pub fn open(&self, cookie_value: Option<&str>) -> SessionPair {
        let Some(token) = cookie_value else {
            return SessionPair::default();
        };

        match self.signer.verify(token) {
            Ok(session) => SessionPair {
                request: session.clone(),
                response: session,
            },
            Err(err) => {
                tracing::debug!("Session cookie rejected, proceeding with empty session: {err}");
                SessionPair::default()
            }
        }
    }

    /// Produce the outbound cookie value, if one should be written.
    ///
    /// A token is issued only when the exchange succeeded and the response
    /// mapping still carries data. A cleared mapping suppresses the write
    /// but does not expire a cookie the client already holds; logout needs
    /// an explicit expiring write on top.
    pub fn seal(
        &self,
        succeeded: bool,
        response_session: &Session,
    ) -> Result<Option<String>, SessionError> {
        if !succeeded || response_session.is_empty() {
            return Ok(None);
        }
        self.signer.sign(response_session).map(Some)
    }
}
