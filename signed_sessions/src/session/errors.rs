use thiserror::Error;

use crate::utils::UtilError;

/// A token failed its authenticity checks.
///
/// Every variant means the same thing to the session lifecycle: the cookie
/// cannot be trusted and the request proceeds with an empty session. None
/// of these ever reach a handler or the client.
#[derive(Debug, Error, Clone)]
pub enum AuthenticityError {
    #[error("Token format error: {0}")]
    TokenFormat(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Signature mismatch")]
    BadSignature,

    #[error("Payload error: {0}")]
    Payload(String),
}

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
