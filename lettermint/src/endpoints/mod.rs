//! API endpoint builders.
//!
//! Each endpoint accumulates request parameters through chained setters
//! and submits them through the shared HTTP client. Instances are
//! constructed lazily by the [`Lettermint`](crate::Lettermint) facade.

pub mod email;

pub use email::{Attachment, EmailEndpoint, EmailPayload};

/// A constructed endpoint instance, as held by the facade cache.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// The `/v1/send` email endpoint.
    Email(EmailEndpoint),
}
