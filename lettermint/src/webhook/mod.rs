//! Webhook verification for inbound Lettermint callbacks.
//!
//! Lettermint signs every webhook request with HMAC-SHA256 and transmits
//! the signature next to the payload:
//!
//! ```text
//! X-Lettermint-Signature: t={unix timestamp},v1={hex HMAC-SHA256}
//! X-Lettermint-Delivery: {unix timestamp}
//! ```
//!
//! [`Webhook`] recomputes the digest over `{timestamp}.{payload}`, compares
//! it in constant time, and rejects timestamps outside the configured
//! tolerance window in either direction, bounding both replay of old
//! requests and forged future timestamps.

mod signature;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Verifier for inbound webhook requests.
///
/// Owns the signing secret and tolerance window for its lifetime; each
/// [`verify`](Self::verify) call is a pure function of its inputs, the
/// configuration, and the ambient clock.
#[derive(Debug, Clone)]
pub struct Webhook {
    secret: String,
    tolerance: i64,
}

impl Webhook {
    /// Header carrying `t={timestamp},v1={signature}`.
    pub const SIGNATURE_HEADER: &'static str = "X-Lettermint-Signature";

    /// Header carrying the delivery timestamp as a decimal string.
    pub const DELIVERY_HEADER: &'static str = "X-Lettermint-Delivery";

    /// Default maximum allowed clock difference in seconds.
    pub const DEFAULT_TOLERANCE: i64 = 300;

    /// Create a verifier with the default tolerance window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        Self::with_tolerance(secret, Self::DEFAULT_TOLERANCE)
    }

    /// Create a verifier with an explicit tolerance window in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `secret` is empty.
    pub fn with_tolerance(secret: impl Into<String>, tolerance: i64) -> Result<Self> {
        let secret = secret.into();

        if secret.is_empty() {
            return Err(Error::Configuration(
                "webhook secret cannot be empty".to_string(),
            ));
        }

        Ok(Self { secret, tolerance })
    }

    /// Verify a webhook signature and return the decoded payload.
    ///
    /// `expected_timestamp` is the value of the delivery header when it was
    /// transmitted separately; it must match the timestamp embedded in the
    /// signature header, which detects tampering between the two
    /// independently transmitted sources.
    ///
    /// # Errors
    ///
    /// * [`Error::SignatureFormat`] - header missing `t` or `v1`
    /// * [`Error::TimestampMismatch`] - `expected_timestamp` disagrees with
    ///   the envelope
    /// * [`Error::ToleranceExceeded`] - timestamp outside the tolerance
    ///   window
    /// * [`Error::InvalidSignature`] - HMAC digest does not match
    /// * [`Error::PayloadDecode`] - payload is not valid JSON
    pub fn verify(
        &self,
        payload: &str,
        signature_header: &str,
        expected_timestamp: Option<i64>,
    ) -> Result<serde_json::Value> {
        self.verify_at(payload, signature_header, expected_timestamp, unix_now())
    }

    /// Verify a webhook using its HTTP headers and return the decoded
    /// payload.
    ///
    /// Header names are matched case-insensitively, since proxies and
    /// frameworks routinely alter casing in transit. Both the signature and
    /// the delivery header are required; the delivery value is cross-checked
    /// against the timestamp embedded in the signature.
    ///
    /// # Errors
    ///
    /// [`Error::MissingHeader`] if either header is absent, otherwise the
    /// same errors as [`verify`](Self::verify).
    pub fn verify_headers<'a, I>(&self, headers: I, payload: &str) -> Result<serde_json::Value>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let normalized: HashMap<String, &str> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        let signature_header = normalized
            .get(&Self::SIGNATURE_HEADER.to_ascii_lowercase())
            .ok_or(Error::MissingHeader(Self::SIGNATURE_HEADER))?;

        let delivery = normalized
            .get(&Self::DELIVERY_HEADER.to_ascii_lowercase())
            .ok_or(Error::MissingHeader(Self::DELIVERY_HEADER))?;

        // A non-integer delivery value can never match the envelope
        // timestamp, so it surfaces as the same mismatch.
        let delivery_timestamp = delivery
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::TimestampMismatch)?;

        self.verify(payload, signature_header, Some(delivery_timestamp))
    }

    /// Stateless convenience: construct a throwaway verifier and verify in
    /// one call.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new) followed by [`verify`](Self::verify).
    pub fn verify_signature(
        payload: &str,
        signature_header: &str,
        secret: &str,
        expected_timestamp: Option<i64>,
        tolerance: Option<i64>,
    ) -> Result<serde_json::Value> {
        let webhook =
            Self::with_tolerance(secret, tolerance.unwrap_or(Self::DEFAULT_TOLERANCE))?;

        webhook.verify(payload, signature_header, expected_timestamp)
    }

    /// Verification against an explicit clock; `verify` passes the ambient
    /// time, tests pin it near tolerance boundaries.
    fn verify_at(
        &self,
        payload: &str,
        signature_header: &str,
        expected_timestamp: Option<i64>,
        now: i64,
    ) -> Result<serde_json::Value> {
        let envelope = signature::parse_signature(signature_header)?;

        if let Some(expected) = expected_timestamp {
            if expected != envelope.timestamp {
                warn!(
                    envelope_timestamp = envelope.timestamp,
                    delivery_timestamp = expected,
                    "webhook_timestamp_mismatch"
                );
                return Err(Error::TimestampMismatch);
            }
        }

        self.validate_timestamp(envelope.timestamp, now)?;

        let computed = signature::compute_signature(&self.secret, envelope.timestamp, payload);

        if !signature::constant_time_compare(&computed, &envelope.signature) {
            warn!(
                expected_length = computed.len(),
                actual_length = envelope.signature.len(),
                "webhook_signature_mismatch"
            );
            return Err(Error::InvalidSignature);
        }

        debug!(
            timestamp = envelope.timestamp,
            payload_length = payload.len(),
            "webhook_signature_verified"
        );

        serde_json::from_str(payload).map_err(Error::PayloadDecode)
    }

    /// Reject timestamps outside the tolerance window.
    ///
    /// The check is symmetric: timestamps too far in the past (replay) and
    /// too far in the future (clock-skew forgery) both fail. The boundary
    /// is inclusive, a difference of exactly `tolerance` seconds passes.
    fn validate_timestamp(&self, timestamp: i64, now: i64) -> Result<()> {
        let difference = (now - timestamp).abs();

        if difference > self.tolerance {
            warn!(
                webhook_timestamp = timestamp,
                current_time = now,
                difference_seconds = difference,
                tolerance_seconds = self.tolerance,
                "webhook_timestamp_stale"
            );
            return Err(Error::ToleranceExceeded {
                difference,
                tolerance: self.tolerance,
            });
        }

        Ok(())
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
