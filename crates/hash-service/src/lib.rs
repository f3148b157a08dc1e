//! SHA-256 hashing operation.
//!
//! The HTTP surface lives in `microservice-shared`; this crate only defines
//! what `POST /hash/` computes.

use std::fmt::Write as _;

use microservice_shared::{Operation, ServiceError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Response body for `POST /hash/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashResponse {
    /// Lowercase hex SHA-256 digest (64 characters).
    pub hash: String,
}

/// Compute the lowercase hex SHA-256 digest of the UTF-8 bytes of `input_string`.
///
/// # Errors
///
/// - [`ServiceError::InvalidInput`] if the input is empty
/// - [`ServiceError::ComputationFailed`] if the digest cannot be encoded
///
/// # Example
///
/// ```
/// use hash_service::compute_hash;
///
/// let hash = compute_hash("test").unwrap();
/// assert_eq!(hash, "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08");
/// ```
pub fn compute_hash(input_string: &str) -> Result<String, ServiceError> {
    if input_string.is_empty() {
        return Err(ServiceError::invalid_input("Input string cannot be empty"));
    }

    let digest = Sha256::digest(input_string.as_bytes());
    digest
        .iter()
        .try_fold(String::with_capacity(digest.len() * 2), |mut hex, byte| {
            write!(hex, "{byte:02x}").map(|()| hex)
        })
        .map_err(|e| {
            ServiceError::computation_failed(HashOperation::NAME, "Failed to compute hash")
                .with_detail("error", e.to_string())
        })
}

/// The hashing operation mounted at `/hash/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashOperation;

impl Operation for HashOperation {
    const NAME: &'static str = "hash";
    const DISPLAY_NAME: &'static str = "Hash Service";
    type Response = HashResponse;

    fn execute(&self, input: &str) -> Result<HashResponse, ServiceError> {
        compute_hash(input).map(|hash| HashResponse { hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash_known_value() {
        let result = compute_hash("test").unwrap();
        assert_eq!(result.len(), 64);
        assert_eq!(
            result,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_compute_hash_is_deterministic() {
        for input in ["a", "hello world", "ünïcødé ✓", "  "] {
            assert_eq!(compute_hash(input).unwrap(), compute_hash(input).unwrap());
        }
    }

    #[test]
    fn test_compute_hash_is_lowercase_hex() {
        let hash = compute_hash("The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(
            hash,
            "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592"
        );
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_compute_hash_uses_utf8_bytes() {
        // U+00E9 encodes to 0xC3 0xA9.
        assert_eq!(
            compute_hash("é").unwrap(),
            format!("{:x}", Sha256::digest([0xC3u8, 0xA9]))
        );
    }

    #[test]
    fn test_compute_hash_empty_input() {
        let err = compute_hash("").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput { .. }));
        assert_eq!(err.type_tag(), "invalidinputerror");
        assert_eq!(err.status().as_u16(), 400);
    }

    #[test]
    fn test_hash_operation_wraps_response() {
        let response = HashOperation.execute("test").unwrap();
        assert_eq!(response.hash, compute_hash("test").unwrap());
        assert_eq!(HashOperation::route(), "/hash/");
        assert_eq!(HashOperation::span_name(), "hash-endpoint");
    }
}
