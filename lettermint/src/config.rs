//! Client configuration.
//!
//! Configuration can be built programmatically or read from environment
//! variables. Values are fixed once the client is constructed.

use std::env;

use tracing::warn;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.lettermint.co/v1";

/// Default HTTP request timeout in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

/// Client configuration for the Lettermint API.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token sent as the `x-lettermint-token` header.
    pub api_token: String,

    /// Base URL for API requests. A trailing slash is stripped when the
    /// HTTP client is constructed.
    pub base_url: String,

    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Config {
    /// Create a configuration with the default base URL and timeout.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `LETTERMINT_API_TOKEN`, `LETTERMINT_BASE_URL` and
    /// `LETTERMINT_REQUEST_TIMEOUT_MS`, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        Config {
            api_token: env::var("LETTERMINT_API_TOKEN").unwrap_or_default(),

            base_url: env::var("LETTERMINT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),

            request_timeout_ms: parse_u64(
                "LETTERMINT_REQUEST_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            ),
        }
    }
}

/// Parse an integer environment variable, falling back to a default.
fn parse_u64(name: &str, default: u64) -> u64 {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid integer value, using default");
            default
        }
    }
}
