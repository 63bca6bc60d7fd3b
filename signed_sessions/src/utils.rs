use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use ring::rand::SecureRandom;

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

pub(crate) fn base64url_decode(input: &str) -> Result<Vec<u8>, UtilError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|_| UtilError::Format("Failed to decode base64url".to_string()))?;
    Ok(decoded)
}

pub(crate) fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Generate a random url-safe string, e.g. for an ephemeral secret key.
pub(crate) fn gen_random_string(len: usize) -> Result<String, UtilError> {
    Ok(base64url_encode(&gen_random_bytes(len)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_round_trip() {
        let input = b"signed session payload".to_vec();
        let encoded = base64url_encode(&input);
        let decoded = base64url_decode(&encoded).expect("decoding encoded input should succeed");
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_base64url_encode_is_url_safe_without_padding() {
        // 0xfb 0xff maps onto characters outside the standard alphabet
        let encoded = base64url_encode(&[0xfb, 0xff, 0xfe]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_base64url_decode_rejects_invalid_input() {
        assert!(base64url_decode("not base64url!").is_err());
        assert!(base64url_decode("a").is_err());
    }

    #[test]
    fn test_gen_random_bytes_length_and_uniqueness() {
        let first = gen_random_bytes(32).expect("random generation should succeed");
        let second = gen_random_bytes(32).expect("random generation should succeed");
        assert_eq!(first.len(), 32);
        assert_eq!(second.len(), 32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_gen_random_string_is_decodable() {
        let value = gen_random_string(24).expect("random generation should succeed");
        let decoded = base64url_decode(&value).expect("generated string should be base64url");
        assert_eq!(decoded.len(), 24);
    }
}
