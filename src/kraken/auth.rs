//! Authentication utilities for the Kraken private API

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

use crate::common::errors::{DcaError, Result};

type HmacSha512 = Hmac<Sha512>;

/// Generate the `API-Sign` value for a private request
///
/// `HMAC-SHA512(base64_decode(secret), path + SHA256(nonce + body))`,
/// base64 encoded.
///
/// # Arguments
/// * `secret` - API private key (base64 encoded)
/// * `path` - URI path, e.g. `/0/private/Balance`
/// * `nonce` - Nonce included in the body
/// * `body` - Url-encoded POST body (contains the nonce)
pub fn sign_request(secret: &str, path: &str, nonce: u64, body: &str) -> Result<String> {
    let secret_bytes = BASE64
        .decode(secret.trim())
        .map_err(|e| DcaError::Auth(format!("Failed to decode secret: {}", e)))?;

    let mut sha = Sha256::new();
    sha.update(nonce.to_string().as_bytes());
    sha.update(body.as_bytes());
    let body_digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(&secret_bytes)
        .map_err(|e| DcaError::Auth(format!("Failed to create HMAC: {}", e)))?;
    mac.update(path.as_bytes());
    mac.update(&body_digest);

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Strictly increasing nonce source, owned by one exchange client
///
/// Nonces are millisecond timestamps; when the clock has not advanced
/// (or went backwards) the previous value plus one is used instead.
#[derive(Debug, Clone, Default)]
pub struct NonceGenerator {
    last: u64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next nonce, greater than every value returned before
    pub fn next_nonce(&mut self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Last nonce handed out, 0 if none
    pub fn last(&self) -> u64 {
        self.last
    }
}
