//! HTTP server infrastructure.
//!
//! Server startup (with optional TLS) and graceful shutdown handling.

pub mod server;
pub mod shutdown;
