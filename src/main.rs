//! dev-proxy
//!
//! Serves a browser SPA from disk and proxies one path prefix to a local
//! inference service, adding permissive CORS headers to every response.
//!
//! ```text
//!     Browser ──▶ router ──┬─ OPTIONS ─────────▶ 200 (preflight)
//!                          ├─ /, /asset ───────▶ static files (asset root)
//!                          └─ /ollama/<rest> ──▶ forwarder ──▶ <upstream>/<rest>
//!                                                    │
//!     Browser ◀── CORS layer ◀── relay (8 KiB chunks) ◀┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use dev_proxy::config::{read_config, validate_config, ConfigError, ServerConfig};
use dev_proxy::lifecycle::{bind_listener, log_banner, Shutdown};
use dev_proxy::observability::{init_logging, init_metrics};
use dev_proxy::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "dev-proxy")]
#[command(about = "Static file server with a CORS proxy to a local inference service", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL the stripped path is appended to.
    #[arg(short, long)]
    upstream: Option<String>,

    /// Path prefix that is proxied.
    #[arg(long)]
    prefix: Option<String>,

    /// Directory of static assets.
    #[arg(short, long)]
    root: Option<String>,

    /// Asset served for `/`.
    #[arg(long)]
    default_asset: Option<String>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Load the file (or defaults), then apply flags on top.
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(upstream) = self.upstream {
            config.proxy.upstream_base_url = upstream;
        }
        if let Some(prefix) = self.prefix {
            config.proxy.prefix = prefix;
        }
        if let Some(root) = self.root {
            config.assets.root = root;
        }
        if let Some(default_asset) = self.default_asset {
            config.assets.default_asset = default_asset;
        }
        if let Some(log_level) = self.log_level {
            config.observability.log_level = log_level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability.log_level);
    tracing::info!("dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = bind_listener(&config).await?;
    log_banner(listener.local_addr()?, &config);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_ctrl_c());

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
