//! Header sanitization in both directions.

use axum::http::header::{HeaderMap, HOST};

use crate::http::cors::is_cors_header;

/// Inbound headers minus `Host`; the client connector sets the right one
/// for the upstream.
pub fn outbound_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(HOST);
    headers
}

/// Upstream response headers minus the CORS headers the server adds itself.
/// Repeated headers keep every value, in order.
pub fn relayed_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if !is_cors_header(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
