//! Health check endpoint.
//!
//! Simple liveness probe returning 200 OK while the process is running.

/// Health check handler.
pub async fn health() -> &'static str {
    "ok"
}
