//! Client facade exposing named endpoint builders.
//!
//! Endpoints are registered under a symbolic name and constructed lazily
//! on first access, sharing one HTTP client. Constructed instances are
//! cached, so payload accumulated through one access is still there on
//! the next.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::client::HttpClient;
use crate::config::Config;
use crate::endpoints::{EmailEndpoint, Endpoint};
use crate::error::{Error, Result};

/// Constructs an endpoint over the shared HTTP client.
type EndpointFactory = fn(Arc<HttpClient>) -> Endpoint;

/// Registry of symbolic endpoint names. Names outside this list fail with
/// [`Error::UnknownEndpoint`].
const ENDPOINT_REGISTRY: &[(&str, EndpointFactory)] = &[("email", email_endpoint)];

fn email_endpoint(http: Arc<HttpClient>) -> Endpoint {
    Endpoint::Email(EmailEndpoint::new(http))
}

/// Entry point to the Lettermint API.
///
/// ```no_run
/// use lettermint::Lettermint;
///
/// # async fn run() -> lettermint::Result<()> {
/// let mut client = Lettermint::new("lm_api_token")?;
///
/// client
///     .email()
///     .from("John Doe <john@acme.com>")
///     .to(["jane@acme.com"])
///     .subject("Hello")
///     .html("<p>Hello!</p>")
///     .send()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Lettermint {
    http: Arc<HttpClient>,
    endpoints: HashMap<&'static str, Endpoint>,
}

impl Lettermint {
    /// Create a client with the default base URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the token is not a valid header
    /// value.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_config(Config::new(api_token))
    }

    /// Create a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL or token is
    /// invalid.
    pub fn with_config(config: Config) -> Result<Self> {
        let http = Arc::new(HttpClient::new(&config)?);

        Ok(Self {
            http,
            endpoints: HashMap::new(),
        })
    }

    /// The email endpoint.
    pub fn email(&mut self) -> &mut EmailEndpoint {
        let Endpoint::Email(endpoint) = self.construct("email", email_endpoint);
        endpoint
    }

    /// Look up an endpoint by its registered name.
    ///
    /// The instance is constructed on first access and cached for
    /// subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEndpoint`] for names outside the registry.
    pub fn endpoint(&mut self, name: &str) -> Result<&mut Endpoint> {
        match ENDPOINT_REGISTRY.iter().find(|(key, _)| *key == name) {
            Some(&(key, factory)) => Ok(self.construct(key, factory)),
            None => Err(Error::UnknownEndpoint(name.to_string())),
        }
    }

    fn construct(&mut self, name: &'static str, factory: EndpointFactory) -> &mut Endpoint {
        self.endpoints.entry(name).or_insert_with(|| {
            debug!(endpoint = name, "endpoint_constructed");
            factory(Arc::clone(&self.http))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::SocketAddr;
    use std::sync::Mutex;

    use axum::extract::State;
    use axum::http::HeaderMap as RequestHeaders;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn client() -> Lettermint {
        Lettermint::new("lm_test_token").unwrap()
    }

    #[test]
    fn test_unknown_endpoint_name() {
        let mut lettermint = client();

        match lettermint.endpoint("sms") {
            Err(Error::UnknownEndpoint(name)) => assert_eq!(name, "sms"),
            other => panic!("expected UnknownEndpoint, got {other:?}"),
        }
    }

    #[test]
    fn test_registered_endpoint_lookup() {
        let mut lettermint = client();

        assert!(matches!(
            lettermint.endpoint("email"),
            Ok(Endpoint::Email(_))
        ));
    }

    #[test]
    fn test_endpoint_instances_are_cached() {
        let mut lettermint = client();

        lettermint.email().subject("Quarterly report");

        // Second access returns the same cached instance, payload intact.
        assert_eq!(
            lettermint.email().payload().subject,
            Some("Quarterly report".to_string())
        );
        assert_eq!(lettermint.endpoints.len(), 1);
    }

    /// Requests captured by the stand-in API server.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Option<String>, Value)>>>);

    async fn capture_send(
        State(captured): State<Captured>,
        headers: RequestHeaders,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let idempotency_key = headers
            .get("Idempotency-Key")
            .and_then(|value| value.to_str().ok())
            .map(String::from);

        captured.0.lock().unwrap().push((idempotency_key, body));

        Json(json!({"status": "queued", "message_id": "msg_1"}))
    }

    async fn spawn_server(captured: Captured) -> SocketAddr {
        let app = Router::new()
            .route("/v1/send", post(capture_send))
            .with_state(captured);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }

    #[tokio::test]
    async fn test_send_forwards_accumulated_payload() {
        let captured = Captured::default();
        let addr = spawn_server(captured.clone()).await;

        let config = Config::new("lm_test_token").with_base_url(format!("http://{addr}"));
        let mut lettermint = Lettermint::with_config(config).unwrap();

        let response = lettermint
            .email()
            .from("John Doe <john@acme.com>")
            .to(["a@x.com", "b@x.com"])
            .subject("Hello")
            .html("<p>Hello!</p>")
            .idempotency_key("order-42")
            .send()
            .await
            .unwrap();

        assert_eq!(response["status"], "queued");

        let requests = captured.0.lock().unwrap();
        let (idempotency_key, body) = &requests[0];

        assert_eq!(idempotency_key.as_deref(), Some("order-42"));
        assert_eq!(
            *body,
            json!({
                "from": "John Doe <john@acme.com>",
                "to": ["a@x.com", "b@x.com"],
                "subject": "Hello",
                "html": "<p>Hello!</p>",
            })
        );
    }

    #[tokio::test]
    async fn test_resend_reuses_accumulated_payload() {
        let captured = Captured::default();
        let addr = spawn_server(captured.clone()).await;

        let config = Config::new("lm_test_token").with_base_url(format!("http://{addr}"));
        let mut lettermint = Lettermint::with_config(config).unwrap();

        lettermint
            .email()
            .from("john@acme.com")
            .to(["jane@acme.com"])
            .subject("First");
        lettermint.email().send().await.unwrap();

        // The cached builder keeps its payload; a later access can adjust
        // one field and send again.
        lettermint.email().subject("Second");
        lettermint.email().send().await.unwrap();

        let requests = captured.0.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].1["subject"], "First");
        assert_eq!(requests[1].1["subject"], "Second");
        assert_eq!(requests[1].1["from"], "john@acme.com");
    }

    #[tokio::test]
    async fn test_send_without_idempotency_key_omits_header() {
        let captured = Captured::default();
        let addr = spawn_server(captured.clone()).await;

        let config = Config::new("lm_test_token").with_base_url(format!("http://{addr}"));
        let mut lettermint = Lettermint::with_config(config).unwrap();

        lettermint
            .email()
            .from("john@acme.com")
            .to(["jane@acme.com"])
            .send()
            .await
            .unwrap();

        let requests = captured.0.lock().unwrap();
        assert_eq!(requests[0].0, None);
    }
}
