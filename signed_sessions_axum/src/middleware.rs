use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use headers::HeaderMapExt;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};

use signed_sessions::{SessionConfig, SessionError, SessionManager};

use super::config::CookieAttributes;
use super::session::{RequestSession, ResponseSession};

/// Expired Max-Age written by [`SignedSessions::expire_session_cookie`].
const EXPIRE_MAX_AGE: i64 = -86400;

/// Shared state for the session middleware: the session manager plus the
/// cookie attributes to stamp on outbound writes.
///
/// Built once at startup and cloned per request; the manager is behind an
/// `Arc` and nothing mutates after construction.
#[derive(Clone)]
pub struct SignedSessions {
    manager: Arc<SessionManager>,
    attributes: CookieAttributes,
}

impl SignedSessions {
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            manager: Arc::new(SessionManager::new(config)?),
            attributes: CookieAttributes::default(),
        })
    }

    pub fn with_attributes(mut self, attributes: CookieAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn cookie_name(&self) -> &str {
        self.manager.cookie_name()
    }

    /// Append an expiring `Set-Cookie` for the session cookie.
    ///
    /// Clearing the response session only suppresses the next write; the
    /// token the client already holds stays valid until its cookie
    /// expires. Handlers implement real logout by sending this expiring
    /// write alongside the cleared session.
    pub fn expire_session_cookie(&self, headers: &mut HeaderMap) {
        let attributes = CookieAttributes {
            max_age: Some(EXPIRE_MAX_AGE),
            ..self.attributes.clone()
        };
        header_set_cookie(headers, self.manager.cookie_name(), "", &attributes);
    }
}

/// Session middleware, for `axum::middleware::from_fn_with_state`.
///
/// Inbound: reads the configured cookie, verifies it, and attaches
/// [`RequestSession`] and [`ResponseSession`] to the request. A missing or
/// rejected cookie attaches empty sessions; the request always proceeds.
///
/// Outbound: if the response status is a success and the response session
/// is non-empty, signs it into a fresh `Set-Cookie`. Failed responses and
/// emptied sessions write nothing.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware::from_fn_with_state, routing::get, Router};
/// use signed_sessions_axum::{SessionConfig, SignedSessions, signed_session};
///
/// let sessions = SignedSessions::new(&SessionConfig::new()).unwrap();
/// let app: Router = Router::new()
///     .route("/", get(|| async { "hello" }))
///     .layer(from_fn_with_state(sessions, signed_session));
/// ```
pub async fn signed_session(
    State(state): State<SignedSessions>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_value = req
        .headers()
        .typed_get::<headers::Cookie>()
        .and_then(|cookies| cookies.get(state.manager.cookie_name()).map(str::to_owned));

    let pair = state.manager.open(cookie_value.as_deref());
    let response_session = ResponseSession::new(pair.response);
    req.extensions_mut().insert(RequestSession::new(pair.request));
    req.extensions_mut().insert(response_session.clone());

    let mut response = next.run(req).await;

    let succeeded = response.status().is_success();
    match state.manager.seal(succeeded, &response_session.snapshot()) {
        Ok(Some(token)) => {
            header_set_cookie(
                response.headers_mut(),
                state.manager.cookie_name(),
                &token,
                &state.attributes,
            );
        }
        Ok(None) => {}
        Err(err) => {
            // The response itself is fine, only the cookie refresh is lost
            tracing::error!("Failed to sign outbound session, cookie not set: {err}");
        }
    }

    response
}

fn header_set_cookie(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
    attributes: &CookieAttributes,
) {
    let cookie = format_set_cookie(name, value, attributes);
    match HeaderValue::from_str(&cookie) {
        Ok(header_value) => {
            headers.append(SET_COOKIE, header_value);
        }
        Err(_) => {
            tracing::error!("Failed to build session Set-Cookie header value");
        }
    }
}

fn format_set_cookie(name: &str, value: &str, attributes: &CookieAttributes) -> String {
    let mut cookie = format!(
        "{name}={value}; SameSite={}",
        attributes.same_site.as_str()
    );
    if attributes.secure {
        cookie.push_str("; Secure");
    }
    if attributes.http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie.push_str("; Path=");
    cookie.push_str(&attributes.path);
    if let Some(max_age) = attributes.max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SameSite;

    fn test_state() -> SignedSessions {
        let config = SessionConfig::new()
            .with_secret_key("k")
            .with_salt(b"s".to_vec());
        SignedSessions::new(&config).expect("Failed to build middleware state")
    }

    #[test]
    fn test_format_set_cookie_defaults() {
        let cookie = format_set_cookie("session", "token", &CookieAttributes::default());
        assert_eq!(cookie, "session=token; SameSite=Lax; Secure; HttpOnly; Path=/");
    }

    #[test]
    fn test_format_set_cookie_custom_attributes() {
        let attributes = CookieAttributes::new()
            .with_path("/app")
            .with_same_site(SameSite::Strict)
            .with_secure(false)
            .with_http_only(false)
            .with_max_age(600);
        let cookie = format_set_cookie("sid", "token", &attributes);
        assert_eq!(cookie, "sid=token; SameSite=Strict; Path=/app; Max-Age=600");
    }

    #[test]
    fn test_header_set_cookie_appends() {
        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, "session", "token", &CookieAttributes::default());

        let value = headers
            .get(SET_COOKIE)
            .expect("Set-Cookie should be present")
            .to_str()
            .expect("Set-Cookie should be valid ascii");
        assert!(value.starts_with("session=token;"));
    }

    /// Test that the expiring write empties the value and carries a
    /// negative Max-Age, overriding any configured positive one
    #[test]
    fn test_expire_session_cookie() {
        let state = test_state().with_attributes(CookieAttributes::new().with_max_age(600));
        let mut headers = HeaderMap::new();
        state.expire_session_cookie(&mut headers);

        let value = headers
            .get(SET_COOKIE)
            .expect("Set-Cookie should be present")
            .to_str()
            .expect("Set-Cookie should be valid ascii");
        assert!(value.starts_with("session=;"));
        assert!(value.ends_with("Max-Age=-86400"));
    }

    #[test]
    fn test_cookie_name_exposed() {
        assert_eq!(test_state().cookie_name(), "session");
    }
}
