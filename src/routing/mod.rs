//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (classification)
//!     → matcher.rs (proxy prefix check)
//!     → Return: Dispatch (Preflight | Static | Proxy | NotFound)
//! ```
//!
//! # Design Decisions
//! - One prefix, one upstream; there is no routing table
//! - Deterministic: same input always yields the same Dispatch

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{Dispatch, RequestRouter};
