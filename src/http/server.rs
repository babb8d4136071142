//! HTTP/HTTPS server startup logic.
//!
//! The transport is selected exactly once, before binding: HTTPS when the
//! certificate manager resolved a key pair, plain HTTP otherwise. It is
//! never renegotiated while the server runs.

use std::net::SocketAddr;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;

use crate::tls::CertPaths;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to load TLS configuration: {0}")]
    TlsConfig(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the server on `addr`, serving HTTPS when `cert` is present.
///
/// This function blocks until the server shuts down.
pub async fn start_server(
    app: Router,
    addr: SocketAddr,
    cert: Option<CertPaths>,
) -> Result<(), ServerError> {
    let handle = Handle::new();

    match cert {
        Some(paths) => start_tls_server(app, addr, &paths, handle).await,
        None => start_plain_server(app, addr, handle).await,
    }
}

/// Start a plain HTTP server (no TLS).
async fn start_plain_server(
    app: Router,
    addr: SocketAddr,
    handle: Handle,
) -> Result<(), ServerError> {
    tracing::warn!(%addr, "Serving plain HTTP - no TLS certificate available");

    shutdown::setup_shutdown_handler(handle.clone());

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}

/// Start the HTTPS server with the resolved self-signed certificate pair.
async fn start_tls_server(
    app: Router,
    addr: SocketAddr,
    paths: &CertPaths,
    handle: Handle,
) -> Result<(), ServerError> {
    tracing::info!(
        %addr,
        cert = %paths.cert_path.display(),
        key = %paths.key_path.display(),
        "Starting HTTPS server"
    );

    let rustls_config = RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path)
        .await
        .map_err(|e| ServerError::TlsConfig(format!("Failed to load certificates: {}", e)))?;

    shutdown::setup_shutdown_handler(handle.clone());

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))
}
