use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::FromRequestParts,
    response::{IntoResponse, Response},
};
use http::{StatusCode, request::Parts};
use serde_json::Value;

use signed_sessions::Session;

/// Rejection returned when a session extractor runs without the
/// [`signed_session`](crate::signed_session) middleware installed.
#[derive(Debug)]
pub struct SessionLayerMissing;

impl IntoResponse for SessionLayerMissing {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session middleware not installed",
        )
            .into_response()
    }
}

/// Read view of the session the client presented, as an axum extractor.
///
/// This is what was actually verified from the inbound cookie; handler
/// writes to [`ResponseSession`] never show up here. Cloning shares the
/// same underlying mapping.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use signed_sessions_axum::RequestSession;
///
/// async fn whoami(session: RequestSession) -> String {
///     match session.get("user").and_then(|v| v.as_str().map(String::from)) {
///         Some(user) => format!("signed in as {user}"),
///         None => "anonymous".to_string(),
///     }
/// }
///
/// let app: Router = Router::new().route("/whoami", get(whoami));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSession(Arc<Session>);

impl RequestSession {
    pub(crate) fn new(session: Session) -> Self {
        Self(Arc::new(session))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_session(&self) -> &Session {
        &self.0
    }
}

/// Mutable response-side session, as an axum extractor.
///
/// Handlers write here to control what gets signed into the outbound
/// cookie. It starts as a deep copy of the verified request session, so
/// mutations never leak back into [`RequestSession`]. Clearing it
/// suppresses the cookie write for this exchange; it does not expire the
/// cookie the client already holds.
#[derive(Debug, Clone)]
pub struct ResponseSession(Arc<Mutex<Session>>);

impl ResponseSession {
    pub(crate) fn new(session: Session) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.lock().insert(key, value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.lock().remove(key)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    /// Replace the whole mapping at once.
    pub fn replace(&self, session: Session) {
        *self.lock() = session;
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current mapping, taken by the middleware when sealing.
    pub(crate) fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.lock().expect("Session mutex poisoned")
    }
}

impl<B> FromRequestParts<B> for RequestSession
where
    B: Send + Sync,
{
    type Rejection = SessionLayerMissing;

    async fn from_request_parts(parts: &mut Parts, _: &B) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestSession>().cloned().ok_or_else(|| {
            tracing::error!("RequestSession extension missing, is the session middleware installed?");
            SessionLayerMissing
        })
    }
}

impl<B> FromRequestParts<B> for ResponseSession
where
    B: Send + Sync,
{
    type Rejection = SessionLayerMissing;

    async fn from_request_parts(parts: &mut Parts, _: &B) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ResponseSession>().cloned().ok_or_else(|| {
            tracing::error!("ResponseSession extension missing, is the session middleware installed?");
            SessionLayerMissing
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session_with_user() -> Session {
        Session::try_from(json!({"user": "alice"})).unwrap()
    }

    #[test]
    fn test_request_session_read_access() {
        let session = RequestSession::new(session_with_user());
        assert_eq!(session.get("user"), Some(&json!("alice")));
        assert!(session.contains_key("user"));
        assert!(!session.is_empty());
        assert_eq!(session.len(), 1);
        assert_eq!(session.as_session().get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_response_session_mutation() {
        let session = ResponseSession::new(session_with_user());

        session.insert("role", "admin");
        assert_eq!(session.get("role"), Some(json!("admin")));
        assert_eq!(session.remove("user"), Some(json!("alice")));
        assert!(!session.is_empty());

        session.clear();
        assert!(session.is_empty());
    }

    /// Test that clones of a ResponseSession observe the same mapping:
    /// the handler's extractor and the middleware's handle must agree
    #[test]
    fn test_response_session_clones_share_state() {
        let session = ResponseSession::new(Session::new());
        let handle = session.clone();

        session.insert("user", "alice");
        assert_eq!(handle.get("user"), Some(json!("alice")));
        assert_eq!(handle.snapshot().get("user"), Some(&json!("alice")));
    }

    /// Test that the middleware snapshot is detached from later mutation
    #[test]
    fn test_snapshot_is_a_copy() {
        let session = ResponseSession::new(session_with_user());
        let snapshot = session.snapshot();

        session.insert("user", "mallory");
        assert_eq!(snapshot.get("user"), Some(&json!("alice")));
    }

    #[test]
    fn test_replace_swaps_the_mapping() {
        let session = ResponseSession::new(session_with_user());
        session.replace(Session::try_from(json!({"theme": "dark"})).unwrap());

        assert_eq!(session.get("theme"), Some(json!("dark")));
        assert_eq!(session.get("user"), None);
    }
}
