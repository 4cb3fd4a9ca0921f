//! Static file serving.
//!
//! Files come from the configured asset directory through tower-http's
//! `ServeDir`, which guesses the content type, answers HEAD, returns 404 for
//! missing files and refuses paths escaping the root.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::uri::InvalidUri;
use axum::http::{Request, Uri};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::handler::RequestHandler;

/// Serves the SPA's files from disk.
#[derive(Clone)]
pub struct StaticHandler {
    root: PathBuf,
    serve_dir: ServeDir,
}

impl StaticHandler {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            serve_dir: ServeDir::new(&root).append_index_html_on_directories(true),
            root,
        }
    }
}

impl RequestHandler for StaticHandler {
    async fn handle(&self, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();
        let result: Result<_, Infallible> = self.serve_dir.clone().oneshot(request).await;
        let response = match result {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        };

        tracing::debug!(
            root = %self.root.display(),
            path = %path,
            status = %response.status(),
            "Served static asset"
        );
        response
    }
}

/// Replace the path of `uri`, keeping its query string.
pub fn with_path(uri: &Uri, path: &str) -> Result<Uri, InvalidUri> {
    let rewritten = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    rewritten.parse()
}
