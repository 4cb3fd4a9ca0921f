//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router with the single dispatch handler
//! - Wire up middleware (tracing, request ID, CORS headers)
//! - Classify each request and hand it to the matching handler
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::static_files::with_path;
use crate::handler::{RequestHandler, StaticHandler};
use crate::http::{cors, request::assign_request_id, response};
use crate::observability::metrics;
use crate::proxy::ProxyHandler;
use crate::routing::{Dispatch, RequestRouter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RequestRouter>,
    pub statics: StaticHandler,
    pub proxy: ProxyHandler,
}

/// HTTP server for the dev proxy.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState {
            router: Arc::new(RequestRouter::from_config(&config)),
            statics: StaticHandler::new(&config.assets.root),
            proxy: ProxyHandler::new(&config.proxy),
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let router = Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state);

        cors::with_cors(router)
            .layer(middleware::from_fn(assign_request_id))
            .layer(TraceLayer::new_for_http())
    }

    /// The application as a plain Axum router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server on `listener` until `shutdown` fires.
    ///
    /// In-flight requests, including open relays, are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.proxy.upstream_base_url,
            prefix = %self.config.proxy.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Single entry point: classify, then hand off.
async fn dispatch(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start = Instant::now();
    let decision = state.router.classify(request.method(), request.uri().path());
    let route = decision.label();

    tracing::debug!(route, "Dispatching request");

    let response = match decision {
        Dispatch::Preflight => response::preflight(),
        Dispatch::Static { path } => match with_path(request.uri(), &path) {
            Ok(uri) => {
                *request.uri_mut() = uri;
                state.statics.handle(request).await
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Static path is not a valid URI");
                response::internal_error()
            }
        },
        Dispatch::Proxy => state.proxy.handle(request).await,
        Dispatch::NotFound => response::not_found(),
    };

    metrics::record_request(route, response.status().as_u16(), start);
    response
}
