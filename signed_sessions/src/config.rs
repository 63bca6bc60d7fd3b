/// Default name of the cookie the session token is stored in.
pub const DEFAULT_SESSION_COOKIE: &str = "session";

/// Constructor-time configuration for [`Signer`](crate::Signer) and
/// [`SessionManager`](crate::SessionManager).
///
/// Secret material left unset is replaced by cryptographically random
/// values when the signer is built. Generated material is never persisted,
/// so every process restart invalidates previously issued sessions.
/// Callers that want sessions to survive restarts must supply their own
/// `secret_key` and `salt`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Key used to sign sessions.
    pub secret_key: Option<String>,
    /// Salt mixed into key derivation, separating this signer's tokens
    /// from other uses of the same secret key.
    pub salt: Option<Vec<u8>>,
    /// Name of the cookie the session is stored in.
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            salt: None,
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.secret_key, None);
        assert_eq!(config.salt, None);
        assert_eq!(config.cookie_name, "session");
    }

    #[test]
    fn test_builder_methods() {
        let config = SessionConfig::new()
            .with_secret_key("k")
            .with_salt(b"s".to_vec())
            .with_cookie_name("sid");
        assert_eq!(config.secret_key.as_deref(), Some("k"));
        assert_eq!(config.salt.as_deref(), Some(b"s".as_slice()));
        assert_eq!(config.cookie_name, "sid");
    }
}
