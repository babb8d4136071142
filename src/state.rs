//! Shared application state for request handlers.

use std::sync::Arc;
use tera::Tera;

use crate::config::AppConfig;

/// URL scheme selected once at startup, depending on whether a certificate
/// pair was resolved. Never renegotiated while the server runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Holds the configuration, the Tera template engine, and the transport
/// scheme resolved at startup. There is no per-request mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub scheme: Scheme,
}

impl AppState {
    /// Creates a new application state from the given configuration,
    /// templates, and resolved transport scheme.
    pub fn new(config: AppConfig, tera: Tera, scheme: Scheme) -> Self {
        Self {
            config: Arc::new(config),
            tera: Arc::new(tera),
            scheme,
        }
    }
}
