//! Path prefix matching.
//!
//! # Design Decisions
//! - Matching is case-sensitive and byte-exact
//! - No normalization: `/ollama/../x` still matches `/ollama/`
//! - No regex to guarantee O(n) matching

/// Matches the request path against a fixed prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns true if `path` starts with the prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}
