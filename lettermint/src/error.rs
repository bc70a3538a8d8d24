//! Error types surfaced by the SDK.
//!
//! Every failure is returned to the immediate caller; nothing is retried
//! internally. Retry policy belongs entirely to the caller.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all SDK operations.
///
/// Messages name the specific missing header or failure reason, but never
/// include the webhook secret or a signature value.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration detected at construction time.
    ///
    /// Raised before any request or verification is attempted, e.g. an
    /// empty webhook secret or an unparseable base URL.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The signature header is missing a usable `t` or `v1` component.
    #[error("invalid signature header, expected format: t={{timestamp}},v1={{signature}}")]
    SignatureFormat,

    /// The delivery header timestamp disagrees with the one embedded in
    /// the signature header.
    #[error("timestamp mismatch between signature and delivery headers")]
    TimestampMismatch,

    /// The webhook timestamp is too far from the current time, in either
    /// direction.
    #[error("timestamp outside tolerance window: difference {difference}s, tolerance {tolerance}s")]
    ToleranceExceeded {
        /// Absolute difference between now and the webhook timestamp.
        difference: i64,
        /// Configured tolerance window in seconds.
        tolerance: i64,
    },

    /// The recomputed HMAC digest does not match the provided signature.
    #[error("signature verification failed")]
    InvalidSignature,

    /// The webhook payload is not valid JSON.
    #[error("failed to decode webhook payload: {0}")]
    PayloadDecode(#[source] serde_json::Error),

    /// A required webhook header is absent.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The client facade was asked for an endpoint name that is not in
    /// the registry.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The underlying HTTP request failed, including non-2xx responses.
    #[error("API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The API responded but the body was not valid JSON.
    #[error("could not decode API response: {0}")]
    ResponseDecode(#[source] serde_json::Error),
}
