//! One upstream round trip per proxied request.
//!
//! # Responsibilities
//! - Map the inbound path onto the upstream base URL
//! - Strip `Host`, forward everything else
//! - Read POST bodies to exactly their declared length
//! - Relay upstream status, headers and a chunked body stream
//!
//! # Design Decisions
//! - No retries, no timeouts: the upstream is local and trusted
//! - Pre-head failures become 500 with the cause in the body
//! - The upstream body is never buffered; see [`Relay`]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header::CONTENT_LENGTH, HeaderMap, Method, Request};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::ProxyConfig;
use crate::handler::RequestHandler;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::headers::{outbound_headers, relayed_headers};
use crate::proxy::relay::Relay;
use crate::proxy::target::target_uri;

/// Forwards proxy-bound requests to the upstream service.
#[derive(Clone)]
pub struct ProxyHandler {
    client: Client<HttpConnector, Body>,
    upstream_base: Arc<str>,
    prefix: Arc<str>,
    chunk_size: usize,
}

impl ProxyHandler {
    pub fn new(config: &ProxyConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            client,
            upstream_base: Arc::from(config.upstream_base_url.as_str()),
            prefix: Arc::from(config.prefix.as_str()),
            chunk_size: config.chunk_size,
        }
    }

    /// Perform the upstream exchange for `request`.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let method = request.method().clone();
        if method != Method::GET && method != Method::POST {
            return Err(ProxyError::MethodNotAllowed(method));
        }

        let path_and_query = request
            .uri()
            .path_and_query()
            .map_or_else(|| request.uri().path(), |pq| pq.as_str());
        let uri = target_uri(&self.upstream_base, &self.prefix, path_and_query)?;

        let (parts, body) = request.into_parts();

        let body = if method == Method::POST {
            let declared = declared_length(&parts.headers)?;
            Body::from(read_declared_body(body, declared).await?)
        } else {
            Body::empty()
        };

        tracing::debug!(method = %method, upstream = %uri, "Forwarding to upstream");

        let mut outbound = Request::new(body);
        *outbound.method_mut() = method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = outbound_headers(&parts.headers);

        let upstream: hyper::Response<Incoming> = self.client.request(outbound).await?;
        let (upstream_parts, upstream_body) = upstream.into_parts();

        tracing::debug!(status = %upstream_parts.status, "Upstream responded");

        let relay = Relay::new(Body::new(upstream_body), self.chunk_size);
        let mut response = Response::new(Body::from_stream(relay));
        *response.status_mut() = upstream_parts.status;
        *response.headers_mut() = relayed_headers(&upstream_parts.headers);
        Ok(response)
    }
}

impl RequestHandler for ProxyHandler {
    async fn handle(&self, request: Request<Body>) -> Response {
        let request_id = request.request_id();
        match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    request_id = %request_id.map_or_else(|| "unknown".to_string(), |id| id.to_string()),
                    error = %e.diagnostic(),
                    "Proxy request failed"
                );
                if matches!(e, ProxyError::Upstream(_)) {
                    metrics::record_upstream_error();
                }
                e.into_response()
            }
        }
    }
}

/// The `Content-Length` header as a number; `None` if absent.
fn declared_length(headers: &HeaderMap) -> Result<Option<usize>, ProxyError> {
    headers
        .get(CONTENT_LENGTH)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .ok_or_else(|| {
                    ProxyError::BodyLength(format!("invalid Content-Length {value:?}"))
                })
        })
        .transpose()
}

/// Read exactly `declared` bytes (zero if undeclared) from `body`.
///
/// A body longer or shorter than declared is an error; nothing is forwarded
/// in that case.
pub async fn read_declared_body(body: Body, declared: Option<usize>) -> Result<Bytes, ProxyError> {
    let expected = declared.unwrap_or(0);
    let bytes = axum::body::to_bytes(body, expected).await.map_err(|e| {
        ProxyError::BodyLength(format!("declared {expected} bytes: {e}"))
    })?;

    if bytes.len() != expected {
        return Err(ProxyError::BodyLength(format!(
            "declared {expected} bytes, received {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}
