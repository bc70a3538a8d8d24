//! Signature header parsing and HMAC-SHA256 digest helpers.
//!
//! Lettermint signs webhook requests with HMAC-SHA256 over
//! `{timestamp}.{payload}` and transmits the result as
//! `X-Lettermint-Signature: t={timestamp},v1={hex digest}`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Parsed `(timestamp, signature)` pair from a signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedEnvelope {
    /// Unix timestamp (seconds) the provider embedded when signing.
    pub timestamp: i64,
    /// Lowercase hex HMAC-SHA256 digest.
    pub signature: String,
}

/// Parse a signature header of the form `t={timestamp},v1={signature}`.
///
/// Segments may appear in any order. Segments that are not `key=value` and
/// unknown keys are skipped; the header is only rejected when no usable
/// `t` or `v1` component is found. Each segment is split on the first `=`
/// only, so the value may itself contain `=`.
pub(crate) fn parse_signature(header: &str) -> Result<SignedEnvelope> {
    let mut timestamp = None;
    let mut signature = None;

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };

        match key {
            "t" => timestamp = value.trim().parse::<i64>().ok(),
            "v1" => signature = Some(value.to_string()),
            _ => {}
        }
    }

    match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => Ok(SignedEnvelope {
            timestamp,
            signature,
        }),
        (timestamp, signature) => {
            warn!(
                has_timestamp = timestamp.is_some(),
                has_signature = signature.is_some(),
                "webhook_signature_format_invalid"
            );
            Err(Error::SignatureFormat)
        }
    }
}

/// Compute the lowercase hex HMAC-SHA256 digest of `{timestamp}.{payload}`.
pub(crate) fn compute_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take a key of any size");

    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
