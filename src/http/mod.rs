//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch)
//!     → request.rs (request ID, tracing span)
//!     → [routing classifies, handler responds]
//!     → cors.rs (CORS headers stamped once)
//!     → Send to client
//! ```

pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt};
pub use server::HttpServer;
