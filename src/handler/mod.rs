//! Request handlers selected by the router.
//!
//! Two capabilities sit behind [`RequestHandler`]: [`StaticHandler`] serves
//! files from the asset root and [`ProxyHandler`](crate::proxy::ProxyHandler)
//! forwards to the upstream. Both turn every failure into a response.

use std::future::Future;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

pub mod static_files;

pub use static_files::StaticHandler;

/// Produces exactly one response for one request.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: Request<Body>) -> impl Future<Output = Response> + Send;
}
