//! Token signing and verification.
//!
//! A token is the base64url-encoded JSON payload joined to a
//! base64url-encoded HMAC-SHA256 over that encoded payload:
//! `<payload>.<signature>`. The dot can never appear inside either
//! segment, so the split is unambiguous.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::SessionConfig;
use crate::session::{AuthenticityError, Session, SessionError};
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes, gen_random_string};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_DELIMITER: char = '.';
const GENERATED_KEY_LEN: usize = 24;
const GENERATED_SALT_LEN: usize = 32;

/// Produces and validates authenticity tokens for session mappings.
///
/// The signing key is derived once from the configured secret key and salt
/// and fixed for the signer's lifetime. A token verifies only under a
/// signer built from the exact same pair; rotating either component
/// invalidates everything issued before.
pub struct Signer {
    derived_key: Vec<u8>,
}

impl Signer {
    /// Build a signer from the supplied configuration.
    ///
    /// Missing secret material is replaced by freshly generated random
    /// values that live only as long as the process. Explicitly supplied
    /// empty material is refused, since signing cannot proceed safely
    /// without it.
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        let secret_key = match &config.secret_key {
            Some(key) if key.is_empty() => {
                return Err(SessionError::Config(
                    "secret_key must not be empty".to_string(),
                ));
            }
            Some(key) => key.clone(),
            None => gen_random_string(GENERATED_KEY_LEN)?,
        };

        let salt = match &config.salt {
            Some(salt) if salt.is_empty() => {
                return Err(SessionError::Config("salt must not be empty".to_string()));
            }
            Some(salt) => salt.clone(),
            None => gen_random_bytes(GENERATED_SALT_LEN)?,
        };

        Ok(Self {
            derived_key: derive_key(secret_key.as_bytes(), &salt),
        })
    }

    /// Sign a session mapping into a token.
    pub fn sign(&self, payload: &Session) -> Result<String, SessionError> {
        let serialized = serde_json::to_vec(payload)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        let encoded = base64url_encode(&serialized);
        let signature = base64url_encode(&self.mac(encoded.as_bytes()));
        Ok(format!("{encoded}{TOKEN_DELIMITER}{signature}"))
    }

    /// Verify a token and recover the session mapping it carries.
    ///
    /// The signature is checked with a constant-time comparison before the
    /// payload is decoded; a token that is malformed, carries a bad
    /// signature, or decodes to anything other than a JSON object is
    /// rejected.
    pub fn verify(&self, token: &str) -> Result<Session, AuthenticityError> {
        let (encoded_payload, encoded_signature) =
            token.rsplit_once(TOKEN_DELIMITER).ok_or_else(|| {
                AuthenticityError::TokenFormat("Missing signature delimiter".to_string())
            })?;

        let signature = base64url_decode(encoded_signature).map_err(|_| {
            AuthenticityError::Encoding("Signature is not valid base64url".to_string())
        })?;

        let expected = self.mac(encoded_payload.as_bytes());
        if !bool::from(expected.ct_eq(&signature)) {
            return Err(AuthenticityError::BadSignature);
        }

        let serialized = base64url_decode(encoded_payload).map_err(|_| {
            AuthenticityError::Encoding("Payload is not valid base64url".to_string())
        })?;

        serde_json::from_slice(&serialized).map_err(|e| AuthenticityError::Payload(e.to_string()))
    }

    fn mac(&self, message: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.derived_key)
            .expect("HMAC can take key of any size");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

fn derive_key(secret_key: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret_key).expect("HMAC can take key of any size");
    mac.update(salt);
    mac.finalize().into_bytes().to_vec()
}
