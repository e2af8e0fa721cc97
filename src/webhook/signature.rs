//! Webhook payload authenticity verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw body using the
//! secret registered on the hook, and sends the result in the
//! `X-Hub-Signature-256` header as `sha256=<hex>`. Verification happens
//! before any parsing; an unverified delivery is never processed. Missing,
//! malformed, and mismatched signatures are distinct failures so callers can
//! audit what actually arrived.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery's signature was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The signature header was absent.
    #[error("missing signature header")]
    Missing,

    /// The header was present but not `sha256=<hex>`.
    #[error("malformed signature header")]
    Malformed,

    /// The signature does not match the payload under the registered secret.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies a delivery's signature header against the raw payload.
///
/// Comparison is constant-time via the HMAC library.
pub fn verify(
    payload: &[u8],
    signature_header: Option<&str>,
    secret: &[u8],
) -> Result<(), SignatureError> {
    let header = signature_header.ok_or(SignatureError::Missing)?;
    let claimed = parse_signature_header(header).ok_or(SignatureError::Malformed)?;

    // HMAC accepts keys of any size
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key of any size");
    mac.update(payload);
    mac.verify_slice(&claimed)
        .map_err(|_| SignatureError::Mismatch)
}

/// Parses a `sha256=<hex>` header value into raw bytes.
///
/// Returns `None` for a missing prefix, a wrong algorithm, or invalid hex.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload under a secret.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature the way GitHub sends it: `sha256=<hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}
