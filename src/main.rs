//! callbackd: a local OAuth 2.0 callback landing server.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration, resolves (or generates) a self-signed TLS certificate,
//! sets up the Axum router, and starts the HTTP(S) server. The transport is
//! chosen once at startup: HTTPS when a certificate pair is available,
//! plain HTTP otherwise.

mod config;
mod error;
mod http;
mod middleware;
mod routes;
mod state;
mod templates;
mod tls;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, CALLBACK_PATH, DEFAULT_LOG_FILTER};
use routes::create_router;
use state::{AppState, Scheme};
use templates::init_templates;

/// callbackd: receive OAuth authorization-code redirects on localhost
#[derive(Parser, Debug)]
#[command(name = "callbackd", version, about)]
struct Args {
    /// Path to configuration file (optional; defaults apply without one)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level filter (e.g., "callbackd=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration before tracing so the log format setting applies
    let config = AppConfig::load(args.config.as_deref())?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Loaded configuration");

    // Resolve the TLS certificate pair before binding anything
    let cert = if config.tls.enabled {
        let cert_dir = config
            .tls
            .cert_dir
            .clone()
            .unwrap_or_else(tls::default_cert_dir);
        tls::ensure_certificate(&cert_dir)?
    } else {
        tracing::info!("TLS disabled by configuration");
        None
    };

    let scheme = if cert.is_some() {
        Scheme::Https
    } else {
        Scheme::Http
    };

    // Initialize Tera templates
    let tera = init_templates()?;

    // Create application state and router
    let port = config.http.port;
    let addr: SocketAddr = format!("{}:{}", config.http.host, port)
        .parse()
        .map_err(|e| format!("Invalid http.host or http.port in config: {}", e))?;

    let state = AppState::new(config, tera, scheme);
    let app = create_router(state);

    tracing::info!(
        url = %format!("{}://localhost:{}{}", scheme.as_str(), port, CALLBACK_PATH),
        "OAuth callback endpoint ready - use this URL as the redirect URI"
    );
    if scheme == Scheme::Https {
        tracing::info!(
            "Certificate is self-signed; browsers will warn before proceeding to localhost"
        );
    }

    http::server::start_server(app, addr, cert).await?;

    Ok(())
}
