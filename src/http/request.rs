//! Per-request identity.
//!
//! # Responsibilities
//! - Mint a unique request ID (UUID v4) as early as possible
//! - Open a tracing span carrying it around the rest of the pipeline
//!
//! # Design Decisions
//! - The ID lives in request extensions only; it is never added to the
//!   headers forwarded upstream or relayed back, which stay exactly as
//!   the client and upstream sent them

use std::fmt;

use axum::body::Body;
use axum::extract::Request;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Unique identifier of one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Access to the [`RequestId`] stored on a request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<RequestId>;
}

impl RequestIdExt for http::Request<Body> {
    fn request_id(&self) -> Option<RequestId> {
        self.extensions().get::<RequestId>().copied()
    }
}

/// Middleware: attach a fresh [`RequestId`] and run the request in its span.
pub async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = RequestId::new();
    request.extensions_mut().insert(id);

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    next.run(request).instrument(span).await
}
