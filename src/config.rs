//! Configuration loading and constants.
//!
//! Loads application configuration from an optional TOML file and defines
//! constants for HTTP cache headers, certificate lifetimes, file names, and
//! default paths. `AppConfig` is the root configuration struct; every field
//! has a default so the server runs with no configuration file at all.

use const_format::formatcp;
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Index page - static instructions, short cache is fine
pub const HTTP_CACHE_INDEX_MAX_AGE: u32 = 60;

/// Index page Cache-Control header value
pub const CACHE_CONTROL_INDEX: &str = formatcp!("public, max-age={}", HTTP_CACHE_INDEX_MAX_AGE);

/// Callback responses carry an authorization code and must never be cached
/// by the browser or any intermediary.
pub const CACHE_CONTROL_CALLBACK: &str = "no-store";

// =============================================================================
// Certificate Constants
// =============================================================================

/// Subdirectory (next to the executable) holding the generated key pair
pub const CERT_DIR_NAME: &str = "certs";

/// PEM certificate file name
pub const CERT_FILE_NAME: &str = "localhost.crt";

/// PEM PKCS#8 private key file name
pub const KEY_FILE_NAME: &str = "localhost.key";

/// Validity window for generated certificates, in days
pub const CERT_VALIDITY_DAYS: i64 = 30;

/// Subject/issuer common name for generated certificates
pub const CERT_COMMON_NAME: &str = "localhost";

/// Subject/issuer organization name for generated certificates
pub const CERT_ORGANIZATION: &str = "OAuth Callback Server";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path (absence is not an error)
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Path the OAuth provider redirects back to
pub const CALLBACK_PATH: &str = "/oauth_callback";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "callbackd=debug,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// TLS / certificate configuration
    pub tls: TlsSettings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8443,
        }
    }
}

/// TLS settings for the listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// Whether to attempt HTTPS at all. When false the server binds plain
    /// HTTP without touching the certificate store.
    pub enabled: bool,
    /// Override for the certificate directory. Defaults to a `certs/`
    /// directory next to the executable.
    pub cert_dir: Option<PathBuf>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cert_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the default location when no
    /// path is given. An explicitly requested file must exist; the default
    /// file is optional and its absence yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required): (&Path, bool) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => return Err(ConfigError::Io(err)),
        };

        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
