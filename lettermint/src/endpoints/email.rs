//! Email sending endpoint.
//!
//! [`EmailEndpoint`] accumulates send parameters through chained setters
//! and submits them to `/v1/send`. No local validation is performed;
//! address formats, required fields and recipient limits are validated by
//! the API.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::client::HttpClient;
use crate::error::Result;

/// API path for sending email.
const SEND_PATH: &str = "/v1/send";

/// A single file attachment.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    /// Attachment filename.
    pub filename: String,
    /// Base64-encoded file content.
    pub content: String,
}

/// Accumulated send parameters, serialized as the request body.
///
/// Fields that were never set are omitted from the JSON entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmailPayload {
    /// Sender address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Recipient addresses, in the order they were given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<String>>,
    /// Subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Plain text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// CC addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<String>>,
    /// BCC addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<String>>,
    /// Reply-To addresses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
    /// Custom message headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// File attachments, in the order they were attached.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    /// Custom metadata key-value pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    /// Route id to send through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Fluent builder for composing and sending an email.
///
/// Setters return `&mut Self` so calls chain. [`send`](Self::send) borrows
/// the builder, so the accumulated payload persists and the same builder
/// may be re-sent; one builder instance must not be driven from concurrent
/// tasks.
#[derive(Debug, Clone)]
pub struct EmailEndpoint {
    http: Arc<HttpClient>,
    payload: EmailPayload,
    idempotency_key: Option<String>,
}

impl EmailEndpoint {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            payload: EmailPayload::default(),
            idempotency_key: None,
        }
    }

    /// Set the sender address.
    ///
    /// RFC 5322 forms are accepted, e.g. `john@acme.com` or
    /// `John Doe <john@acme.com>`.
    pub fn from(&mut self, email: impl Into<String>) -> &mut Self {
        self.payload.from = Some(email.into());
        self
    }

    /// Set the recipient addresses, replacing any previous list.
    pub fn to<I, S>(&mut self, emails: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.to = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    /// Set the subject line.
    pub fn subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.payload.subject = Some(subject.into());
        self
    }

    /// Set the HTML body.
    pub fn html(&mut self, html: impl Into<String>) -> &mut Self {
        self.payload.html = Some(html.into());
        self
    }

    /// Set the plain text body.
    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.payload.text = Some(text.into());
        self
    }

    /// Set the CC addresses, replacing any previous list.
    pub fn cc<I, S>(&mut self, emails: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.cc = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    /// Set the BCC addresses, replacing any previous list.
    pub fn bcc<I, S>(&mut self, emails: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.bcc = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    /// Set the Reply-To addresses, replacing any previous list.
    pub fn reply_to<I, S>(&mut self, emails: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payload.reply_to = Some(emails.into_iter().map(Into::into).collect());
        self
    }

    /// Set custom message headers.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.payload.headers = Some(
            headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Attach a file. Multiple calls accumulate attachments in call order.
    pub fn attach(
        &mut self,
        filename: impl Into<String>,
        base64_content: impl Into<String>,
    ) -> &mut Self {
        self.payload.attachments.push(Attachment {
            filename: filename.into(),
            content: base64_content.into(),
        });
        self
    }

    /// Set the route id to send through.
    pub fn route(&mut self, route: impl Into<String>) -> &mut Self {
        self.payload.route = Some(route.into());
        self
    }

    /// Set custom metadata.
    pub fn metadata<I, K, V>(&mut self, metadata: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.payload.metadata = Some(
            metadata
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    /// Set the idempotency key for the request.
    ///
    /// Sent as the `Idempotency-Key` request header, not as a body field,
    /// letting the API deduplicate retried send requests.
    pub fn idempotency_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Read access to the accumulated payload.
    pub fn payload(&self) -> &EmailPayload {
        &self.payload
    }

    /// Send the composed email using the current payload.
    ///
    /// Returns the decoded API response; transport and decode failures
    /// propagate unchanged.
    pub async fn send(&self) -> Result<serde_json::Value> {
        let mut extra_headers = Vec::new();

        if let Some(key) = &self.idempotency_key {
            extra_headers.push(("Idempotency-Key", key.as_str()));
        }

        info!(
            recipients = self.payload.to.as_ref().map_or(0, Vec::len),
            attachments = self.payload.attachments.len(),
            has_idempotency_key = self.idempotency_key.is_some(),
            "email_send"
        );

        self.http.post(SEND_PATH, &self.payload, &extra_headers).await
    }
}
