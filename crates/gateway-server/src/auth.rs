//! Shared-Secret Auth Gate
//!
//! Protected endpoints require a client secret in the `X-402-Client-Secret`
//! header, compared against the configured secret in constant time.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Header carrying the client secret
pub const SECRET_HEADER: &str = "x-402-client-secret";

/// Auth gate failures
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No secret configured on the server side
    #[error("Client secret not configured in gateway settings")]
    NotConfigured,

    /// Missing or mismatched client secret
    #[error("Invalid client secret")]
    Forbidden,
}

impl AuthError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::NotConfigured => "x402_config_error",
            AuthError::Forbidden => "x402_forbidden",
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> u16 {
        match self {
            AuthError::NotConfigured => 500,
            AuthError::Forbidden => 403,
        }
    }
}

/// Verify a supplied secret against the configured one
///
/// A missing configured secret is a server configuration error, not a
/// client failure. A missing header is treated as an empty secret, which
/// can never match a non-empty configured one.
pub fn verify_secret(configured: Option<&str>, supplied: Option<&str>) -> Result<(), AuthError> {
    let configured = match configured {
        Some(secret) if !secret.is_empty() => secret,
        _ => return Err(AuthError::NotConfigured),
    };

    let supplied = supplied.unwrap_or("");

    // Comparing fixed-size digests avoids leaking the secret length through
    // the comparison itself
    let configured_digest = Sha256::digest(configured.as_bytes());
    let supplied_digest = Sha256::digest(supplied.as_bytes());

    if constant_time_compare(&configured_digest, &supplied_digest) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Constant-time comparison to prevent timing attacks
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
