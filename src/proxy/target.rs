//! Upstream target URL construction.
//!
//! The mapping is plain string concatenation: the proxy prefix is cut off the
//! inbound path (query included) and the rest is appended to the upstream base.
//! Dot segments, duplicate slashes and escapes pass through untouched.

use axum::http::Uri;

use crate::proxy::error::ProxyError;

/// `base + path[prefix.len()..]`, or `None` if `path` lacks the prefix.
pub fn join_target(base: &str, prefix: &str, path: &str) -> Option<String> {
    path.strip_prefix(prefix)
        .map(|remainder| format!("{base}{remainder}"))
}

/// Build the upstream URI for an inbound path-and-query.
pub fn target_uri(base: &str, prefix: &str, path_and_query: &str) -> Result<Uri, ProxyError> {
    let target = join_target(base, prefix, path_and_query).ok_or_else(|| {
        ProxyError::InvalidTarget {
            target: path_and_query.to_string(),
            reason: format!("path does not start with {prefix:?}"),
        }
    })?;

    target
        .parse::<Uri>()
        .map_err(|e| ProxyError::InvalidTarget {
            reason: e.to_string(),
            target,
        })
}
