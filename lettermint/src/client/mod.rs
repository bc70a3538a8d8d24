//! HTTP transport for outbound API requests.

pub mod http;

pub use http::HttpClient;
