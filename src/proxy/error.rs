//! Proxy error taxonomy and its HTTP mapping.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can stop one proxied exchange before the response head
/// reaches the client.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Only GET and POST are forwarded.
    #[error("method {0} is not supported on proxied paths")]
    MethodNotAllowed(Method),

    /// The path does not carry the proxy prefix, or the joined URL is not a URI.
    #[error("invalid upstream target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The request body did not match its declared `Content-Length`.
    #[error("request body length mismatch: {0}")]
    BodyLength(String),

    /// Connecting to or exchanging with the upstream failed.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error and all of its sources, joined with `": "`.
    ///
    /// hyper-util's client error only names the failing stage; the useful
    /// cause (e.g. "Connection refused") sits further down the chain.
    pub fn diagnostic(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        message
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), format!("proxy error: {}", self.diagnostic())).into_response()
    }
}
