//! Lettermint - Rust SDK for the Lettermint transactional email API.
//!
//! This library covers both directions of the API:
//! - Outbound: [`Lettermint`] exposes fluent endpoint builders that
//!   accumulate a payload through chained setters and submit it over HTTPS
//! - Inbound: [`Webhook`] authenticates callback requests by recomputing
//!   their HMAC-SHA256 signature in constant time and enforcing a
//!   timestamp tolerance window
//!
//! ## Sending
//!
//! ```no_run
//! use lettermint::Lettermint;
//!
//! # async fn run() -> lettermint::Result<()> {
//! let mut client = Lettermint::new("lm_api_token")?;
//!
//! let response = client
//!     .email()
//!     .from("John Doe <john@acme.com>")
//!     .to(["jane@acme.com"])
//!     .subject("Hello")
//!     .html("<p>Hello from Rust!</p>")
//!     .send()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Verifying webhooks
//!
//! ```no_run
//! use lettermint::Webhook;
//!
//! # fn run(headers: Vec<(&str, &str)>, payload: &str) -> lettermint::Result<()> {
//! let webhook = Webhook::new("whsec_secret")?;
//! let event = webhook.verify_headers(headers, payload)?;
//! println!("received {}", event["event"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod lettermint;
pub mod webhook;

// Re-export commonly used types
pub use client::HttpClient;
pub use config::Config;
pub use endpoints::{Attachment, EmailEndpoint, EmailPayload, Endpoint};
pub use error::{Error, Result};
pub use lettermint::Lettermint;
pub use webhook::Webhook;
