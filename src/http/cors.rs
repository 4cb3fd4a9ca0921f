//! Cross-origin headers stamped on every response.
//!
//! Overriding semantics: whatever a handler or the upstream put under these
//! names is replaced, so each header appears exactly once.

use axum::http::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// The CORS headers and their fixed values.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN)),
        (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS)),
        (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
    ]
}

/// True for the header names this module owns.
///
/// `HeaderName` is always lowercase, so equality is already case-insensitive.
pub fn is_cors_header(name: &HeaderName) -> bool {
    name == ACCESS_CONTROL_ALLOW_ORIGIN
        || name == ACCESS_CONTROL_ALLOW_METHODS
        || name == ACCESS_CONTROL_ALLOW_HEADERS
}

/// Wrap `router` so every response leaves with the CORS headers.
pub fn with_cors<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    cors_headers()
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, value))
        })
}
