//! Proxy forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy-bound request (from the router)
//!     → target.rs (prefix stripped, base URL prepended)
//!     → headers.rs (Host removed)
//!     → forwarder.rs (body read, upstream call)
//!     → headers.rs (CORS names removed from upstream headers)
//!     → relay.rs (body streamed back in bounded chunks)
//! ```

pub mod error;
pub mod forwarder;
pub mod headers;
pub mod relay;
pub mod target;

pub use error::ProxyError;
pub use forwarder::ProxyHandler;
pub use relay::Relay;
