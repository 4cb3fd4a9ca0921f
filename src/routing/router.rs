//! Request classification.
//!
//! # Responsibilities
//! - Answer CORS preflights before anything else
//! - Rewrite the document root to the default asset
//! - Send prefixed paths to the proxy, everything else to static serving
//! - Reject writes to static paths
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Pure function of method and path; headers and body are not inspected
//! - Explicit NotFound rather than silent default

use axum::http::Method;

use crate::config::ServerConfig;
use crate::routing::matcher::PathPrefixMatcher;

/// What the server should do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// CORS preflight: 200 with an empty body.
    Preflight,
    /// Serve `path` from the asset directory.
    Static { path: String },
    /// Forward to the upstream.
    Proxy,
    /// Nothing handles this method/path pair.
    NotFound,
}

impl Dispatch {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Dispatch::Preflight => "preflight",
            Dispatch::Static { .. } => "static",
            Dispatch::Proxy => "proxy",
            Dispatch::NotFound => "not_found",
        }
    }
}

/// Classifies inbound requests.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    proxy: PathPrefixMatcher,
    default_asset: String,
}

impl RequestRouter {
    pub fn new(proxy_prefix: impl Into<String>, default_asset: impl Into<String>) -> Self {
        Self {
            proxy: PathPrefixMatcher::new(proxy_prefix),
            default_asset: default_asset.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.proxy.prefix.clone(),
            config.assets.default_asset.clone(),
        )
    }

    /// Decide how to handle `method` on `path`.
    pub fn classify(&self, method: &Method, path: &str) -> Dispatch {
        if method == Method::OPTIONS {
            return Dispatch::Preflight;
        }

        let readable = method == Method::GET || method == Method::HEAD;

        if path.is_empty() || path == "/" {
            return if readable {
                Dispatch::Static {
                    path: self.default_asset.clone(),
                }
            } else {
                Dispatch::NotFound
            };
        }

        if self.proxy.matches(path) {
            return Dispatch::Proxy;
        }

        if readable {
            Dispatch::Static {
                path: path.to_string(),
            }
        } else {
            Dispatch::NotFound
        }
    }
}
