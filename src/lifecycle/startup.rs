//! Startup: bind the listener and announce where things are.
//!
//! Any failure here is fatal; nothing is serving yet.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the configured listen address.
pub async fn bind_listener(config: &ServerConfig) -> Result<TcpListener, StartupError> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    Ok(listener)
}

/// Log the startup banner: where to point a browser and where proxied calls go.
pub fn log_banner(local_addr: SocketAddr, config: &ServerConfig) {
    let port = local_addr.port();
    tracing::info!(address = %local_addr, "Dev server listening");
    tracing::info!("Serving at: http://localhost:{port}");
    tracing::info!(
        "Main app: http://localhost:{port}{}",
        config.assets.default_asset
    );
    tracing::info!(
        "Proxying http://localhost:{port}{}* -> {}*",
        config.proxy.prefix,
        config.proxy.upstream_base_url
    );
    tracing::info!(root = %config.assets.root, "Static assets");
    tracing::info!("Press Ctrl+C to stop the server");
}
