//! Thin wrapper around `reqwest` for authenticated JSON requests.
//!
//! The client owns the authentication and content-type headers and the
//! request timeout. It performs no retries; a transport failure surfaces
//! immediately to the caller, who owns retry policy.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Header carrying the API token on every request.
const TOKEN_HEADER: &str = "x-lettermint-token";

/// Authenticated JSON HTTP client shared by all endpoints.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    /// Build a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL does not parse or
    /// the API token is not a valid header value, and [`Error::Transport`]
    /// if the underlying client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| Error::Configuration(format!("invalid base URL: {e}")))?;

        let mut token = HeaderValue::from_str(&config.api_token).map_err(|_| {
            Error::Configuration("API token contains characters not allowed in headers".to_string())
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(TOKEN_HEADER, token);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(Error::Transport)?;

        Ok(Self { client, base_url })
    }

    /// POST a JSON body to `path` and decode the JSON response.
    ///
    /// `path` is resolved against the base URL with RFC 3986 semantics, so
    /// an absolute path like `/v1/send` replaces the base path. Extra
    /// headers are added on top of the defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] on connection failure, timeout or a non-2xx
    /// status; [`Error::ResponseDecode`] when the response body is not
    /// valid JSON.
    pub async fn post<T>(
        &self,
        path: &str,
        body: &T,
        extra_headers: &[(&str, &str)],
    ) -> Result<serde_json::Value>
    where
        T: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid request path {path:?}: {e}")))?;

        let mut request = self.client.post(url).json(body);

        for (name, value) in extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(path = path, error = %e, "api_request_failed");
            Error::Transport(e)
        })?;

        let status = response.status();

        let response = response.error_for_status().map_err(|e| {
            warn!(path = path, status = status.as_u16(), "api_request_failed");
            Error::Transport(e)
        })?;

        let body = response.text().await.map_err(Error::Transport)?;

        debug!(
            path = path,
            status = status.as_u16(),
            body_length = body.len(),
            "api_request"
        );

        serde_json::from_str(&body).map_err(Error::ResponseDecode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap as RequestHeaders, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Most recent request seen by the capture server.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Option<(HashMap<String, String>, Value)>>>);

    async fn capture_send(
        State(captured): State<Captured>,
        headers: RequestHeaders,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        *captured.0.lock().unwrap() = Some((headers, body));

        Json(json!({"status": "queued", "message_id": "msg_1"}))
    }

    async fn spawn_server(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }

    fn client_for(addr: SocketAddr) -> HttpClient {
        let config = Config::new("lm_test_token").with_base_url(format!("http://{addr}"));
        HttpClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_post_sends_json_with_default_headers() {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v1/send", post(capture_send))
            .with_state(captured.clone());
        let addr = spawn_server(app).await;

        let payload = json!({"from": "john@acme.com", "to": ["jane@acme.com"]});
        let response = client_for(addr).post("/v1/send", &payload, &[]).await.unwrap();

        assert_eq!(response["status"], "queued");
        assert_eq!(response["message_id"], "msg_1");

        let (headers, body) = captured.0.lock().unwrap().clone().unwrap();
        assert_eq!(body, payload);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("x-lettermint-token").unwrap(), "lm_test_token");
    }

    #[tokio::test]
    async fn test_post_forwards_extra_headers() {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v1/send", post(capture_send))
            .with_state(captured.clone());
        let addr = spawn_server(app).await;

        client_for(addr)
            .post("/v1/send", &json!({}), &[("Idempotency-Key", "order-42")])
            .await
            .unwrap();

        let (headers, _) = captured.0.lock().unwrap().clone().unwrap();
        assert_eq!(headers.get("idempotency-key").unwrap(), "order-42");
    }

    #[tokio::test]
    async fn test_post_base_url_trailing_slash_stripped() {
        let captured = Captured::default();
        let app = Router::new()
            .route("/v1/send", post(capture_send))
            .with_state(captured.clone());
        let addr = spawn_server(app).await;

        let config = Config::new("token").with_base_url(format!("http://{addr}/"));
        let client = HttpClient::new(&config).unwrap();

        client.post("/v1/send", &json!({}), &[]).await.unwrap();
        assert!(captured.0.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_post_non_2xx_is_transport_error() {
        let app = Router::new().route(
            "/v1/send",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid recipient") }),
        );
        let addr = spawn_server(app).await;

        let err = client_for(addr)
            .post("/v1/send", &json!({}), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[tokio::test]
    async fn test_post_non_json_response_is_decode_error() {
        let app = Router::new().route("/v1/send", post(|| async { "not json" }));
        let addr = spawn_server(app).await;

        let err = client_for(addr)
            .post("/v1/send", &json!({}), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ResponseDecode(_)));
    }

    #[tokio::test]
    async fn test_post_connection_failure_is_transport_error() {
        // Port 9 (discard) is not listening.
        let config = Config::new("token")
            .with_base_url("http://127.0.0.1:9")
            .with_request_timeout_ms(1_000);
        let client = HttpClient::new(&config).unwrap();

        let err = client.post("/v1/send", &json!({}), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config::new("token").with_base_url("not a url");
        assert!(matches!(
            HttpClient::new(&config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let config = Config::new("token\nwith-newline");
        assert!(matches!(
            HttpClient::new(&config),
            Err(Error::Configuration(_))
        ));
    }
}
