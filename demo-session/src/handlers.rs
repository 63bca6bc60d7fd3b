use axum::extract::{Path, State};
use http::HeaderMap;

use signed_sessions_axum::{RequestSession, ResponseSession, SignedSessions};

pub(crate) async fn index(request: RequestSession, response: ResponseSession) -> String {
    let visits = request.get("visits").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
    response.insert("visits", visits);
    format!("visit {visits}; try /login/{{user}}, /whoami and /logout\n")
}

pub(crate) async fn whoami(session: RequestSession) -> String {
    match session.get("user").and_then(|v| v.as_str().map(String::from)) {
        Some(user) => format!("signed in as {user}\n"),
        None => "anonymous\n".to_string(),
    }
}

pub(crate) async fn login(Path(user): Path<String>, session: ResponseSession) -> String {
    session.insert("user", user.clone());
    tracing::debug!("Session established for {user}");
    format!("signed in as {user}\n")
}

pub(crate) async fn logout(
    State(sessions): State<SignedSessions>,
    session: ResponseSession,
) -> (HeaderMap, &'static str) {
    // Clearing only suppresses the refresh; the expiring write below is
    // what removes the cookie from the client
    session.clear();
    let mut headers = HeaderMap::new();
    sessions.expire_session_cookie(&mut headers);
    (headers, "signed out\n")
}
