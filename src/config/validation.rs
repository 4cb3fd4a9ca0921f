//! Configuration validation.
//!
//! Serde handles syntax; this module checks meaning. Every problem found is
//! reported, not just the first.

use axum::http::uri::PathAndQuery;
use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("proxy.upstream_base_url {url:?} is not a valid URL: {reason}")]
    InvalidUpstream { url: String, reason: String },

    #[error("proxy.upstream_base_url {0:?} must use http")]
    UnsupportedScheme(String),

    #[error("proxy.upstream_base_url {0:?} must end with '/'")]
    UpstreamWithoutTrailingSlash(String),

    #[error("proxy.prefix {0:?} must start and end with '/' and not be '/'")]
    InvalidPrefix(String),

    #[error("proxy.chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("assets.default_asset {0:?} must be a URI path starting with '/'")]
    InvalidDefaultAsset(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let base = &config.proxy.upstream_base_url;
    match Url::parse(base) {
        Ok(url) if url.scheme() != "http" => {
            errors.push(ValidationError::UnsupportedScheme(base.clone()));
        }
        // The remainder after the prefix is appended verbatim.
        Ok(url) if !base.ends_with('/') || !url.path().ends_with('/') => {
            errors.push(ValidationError::UpstreamWithoutTrailingSlash(base.clone()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUpstream {
            url: base.clone(),
            reason: e.to_string(),
        }),
    }

    let prefix = &config.proxy.prefix;
    if prefix.len() < 2 || !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    if config.proxy.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    let default_asset = &config.assets.default_asset;
    if !default_asset.starts_with('/')
        || default_asset.contains('?')
        || default_asset.parse::<PathAndQuery>().is_err()
    {
        errors.push(ValidationError::InvalidDefaultAsset(
            config.assets.default_asset.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
