//! Self-signed certificate lifecycle for the local HTTPS listener.
//!
//! On startup the server asks this module for a usable key pair. An existing
//! pair is reused as long as the certificate parses and has not expired;
//! anything else (missing files, garbage PEM, past `notAfter`) triggers
//! regeneration of a fresh 30-day pair. Generation failure is not fatal: the
//! caller falls back to plain HTTP, which is an acceptable tradeoff for a
//! local development tool.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use time::{Duration, OffsetDateTime};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::config::{
    CERT_COMMON_NAME, CERT_DIR_NAME, CERT_FILE_NAME, CERT_ORGANIZATION, CERT_VALIDITY_DAYS,
    KEY_FILE_NAME,
};

/// Certificate resolution error. Filesystem failures are fatal at startup;
/// there is no retry logic.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    #[error("Failed to create certificate directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to persist {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// On-disk locations of a PEM certificate and its private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl CertPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            cert_path: dir.join(CERT_FILE_NAME),
            key_path: dir.join(KEY_FILE_NAME),
        }
    }
}

/// Result of inspecting an on-disk certificate. Parse failures are not
/// surfaced as errors; they are a reason to regenerate, and the caller
/// decides that.
#[derive(Debug)]
pub enum CertStatus {
    Valid { not_after: OffsetDateTime },
    Invalid(String),
}

/// Default certificate directory: `certs/` next to the executable.
pub fn default_cert_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CERT_DIR_NAME)
}

/// Ensure a valid, unexpired key pair exists in `dir` and return its paths.
///
/// Returns `Ok(None)` when key generation itself is unavailable; the caller
/// must then serve plain HTTP instead. Filesystem errors propagate.
pub fn ensure_certificate(dir: &Path) -> Result<Option<CertPaths>, CertError> {
    fs::create_dir_all(dir).map_err(|source| CertError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = CertPaths::in_dir(dir);

    if paths.cert_path.exists() && paths.key_path.exists() {
        match inspect_certificate(&paths.cert_path) {
            CertStatus::Valid { not_after } if OffsetDateTime::now_utc() < not_after => {
                tracing::info!(
                    cert = %paths.cert_path.display(),
                    expires = %not_after,
                    "Reusing existing TLS certificate"
                );
                return Ok(Some(paths));
            }
            CertStatus::Valid { not_after } => {
                tracing::info!(expired = %not_after, "TLS certificate expired, regenerating");
            }
            CertStatus::Invalid(reason) => {
                tracing::warn!(%reason, "TLS certificate unreadable, regenerating");
            }
        }
    }

    let (cert_pem, key_pem) = match generate_self_signed() {
        Ok(pair) => pair,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "Certificate generation unavailable, falling back to plain HTTP"
            );
            return Ok(None);
        }
    };

    persist(&paths.cert_path, cert_pem.as_bytes())?;
    persist(&paths.key_path, key_pem.as_bytes())?;
    tracing::info!(dir = %dir.display(), "Generated new self-signed TLS certificate");

    Ok(Some(paths))
}

/// Inspect the certificate at `path` without ever failing: unreadable or
/// unparseable input yields `CertStatus::Invalid` with the reason.
pub fn inspect_certificate(path: &Path) -> CertStatus {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => return CertStatus::Invalid(format!("read failed: {}", err)),
    };

    let (_, pem) = match parse_x509_pem(&bytes) {
        Ok(parsed) => parsed,
        Err(err) => return CertStatus::Invalid(format!("invalid PEM: {}", err)),
    };

    let (_, cert) = match X509Certificate::from_der(pem.contents.as_slice()) {
        Ok(parsed) => parsed,
        Err(err) => return CertStatus::Invalid(format!("invalid X.509: {}", err)),
    };

    CertStatus::Valid {
        not_after: cert.validity().not_after.to_datetime(),
    }
}

/// Generate a self-signed certificate and PKCS#8 private key as PEM strings.
///
/// Subject and issuer are both CN=localhost / O=OAuth Callback Server, with
/// a non-critical SAN extension covering 127.0.0.1 and "localhost". The
/// validity window is exactly [now, now + 30 days].
fn generate_self_signed() -> Result<(String, String), rcgen::Error> {
    // rcgen turns IP-shaped strings into IP SAN entries
    let mut params = CertificateParams::new(vec![
        "127.0.0.1".to_string(),
        CERT_COMMON_NAME.to_string(),
    ])?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, CERT_COMMON_NAME);
    dn.push(DnType::OrganizationName, CERT_ORGANIZATION);
    params.distinguished_name = dn;

    let now = OffsetDateTime::now_utc();
    params.not_before = now;
    params.not_after = now + Duration::days(CERT_VALIDITY_DAYS);

    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;

    Ok((cert.pem(), key_pair.serialize_pem()))
}

/// Write `bytes` to `path` with write-then-rename semantics so a crash never
/// leaves a truncated artifact behind.
fn persist(path: &Path, bytes: &[u8]) -> Result<(), CertError> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let write_err = |source| CertError::Persist {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, bytes).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_validity(path: &Path) -> (OffsetDateTime, OffsetDateTime) {
        let bytes = fs::read(path).unwrap();
        let (_, pem) = parse_x509_pem(&bytes).unwrap();
        let (_, cert) = X509Certificate::from_der(pem.contents.as_slice()).unwrap();
        (
            cert.validity().not_before.to_datetime(),
            cert.validity().not_after.to_datetime(),
        )
    }

    fn write_pair_with_validity(dir: &Path, not_before: OffsetDateTime, not_after: OffsetDateTime) {
        let mut params = CertificateParams::new(vec![CERT_COMMON_NAME.to_string()]).unwrap();
        params.not_before = not_before;
        params.not_after = not_after;
        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        fs::write(dir.join(CERT_FILE_NAME), cert.pem()).unwrap();
        fs::write(dir.join(KEY_FILE_NAME), key_pair.serialize_pem()).unwrap();
    }

    #[test]
    fn generates_pair_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cert_dir = dir.path().join("certs");

        let paths = ensure_certificate(&cert_dir).unwrap().unwrap();
        assert!(paths.cert_path.exists());
        assert!(paths.key_path.exists());

        let key_pem = fs::read_to_string(&paths.key_path).unwrap();
        assert!(key_pem.contains("BEGIN PRIVATE KEY"), "expected PKCS#8 PEM");

        let (not_before, not_after) = parse_validity(&paths.cert_path);
        assert_eq!(not_after - not_before, Duration::days(CERT_VALIDITY_DAYS));
        assert!(not_after > OffsetDateTime::now_utc());
    }

    #[test]
    fn reuses_valid_pair_without_rewriting() {
        let dir = tempfile::tempdir().unwrap();
        let cert_dir = dir.path().to_path_buf();

        let first = ensure_certificate(&cert_dir).unwrap().unwrap();
        let cert_bytes = fs::read(&first.cert_path).unwrap();
        let key_bytes = fs::read(&first.key_path).unwrap();

        let second = ensure_certificate(&cert_dir).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(cert_bytes, fs::read(&second.cert_path).unwrap());
        assert_eq!(key_bytes, fs::read(&second.key_path).unwrap());
    }

    #[test]
    fn regenerates_expired_pair() {
        let dir = tempfile::tempdir().unwrap();
        let cert_dir = dir.path().to_path_buf();

        let now = OffsetDateTime::now_utc();
        write_pair_with_validity(&cert_dir, now - Duration::days(40), now - Duration::days(10));
        let stale_cert = fs::read(cert_dir.join(CERT_FILE_NAME)).unwrap();

        let resolution_time = OffsetDateTime::now_utc();
        let paths = ensure_certificate(&cert_dir).unwrap().unwrap();

        let fresh_cert = fs::read(&paths.cert_path).unwrap();
        assert_ne!(stale_cert, fresh_cert, "expected both files overwritten");

        let (_, not_after) = parse_validity(&paths.cert_path);
        let expected = resolution_time + Duration::days(CERT_VALIDITY_DAYS);
        // ASN.1 validity has one-second resolution
        assert!((not_after - expected).abs() < Duration::seconds(5));
    }

    #[test]
    fn regenerates_unparseable_pair() {
        let dir = tempfile::tempdir().unwrap();
        let cert_dir = dir.path().to_path_buf();

        fs::write(cert_dir.join(CERT_FILE_NAME), "not a certificate").unwrap();
        fs::write(cert_dir.join(KEY_FILE_NAME), "not a key").unwrap();

        let paths = ensure_certificate(&cert_dir).unwrap().unwrap();
        match inspect_certificate(&paths.cert_path) {
            CertStatus::Valid { not_after } => assert!(not_after > OffsetDateTime::now_utc()),
            CertStatus::Invalid(reason) => panic!("expected valid regenerated cert: {}", reason),
        }
    }

    #[test]
    fn inspect_reports_invalid_for_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CERT_FILE_NAME);
        fs::write(&path, "garbage").unwrap();

        assert!(matches!(
            inspect_certificate(&path),
            CertStatus::Invalid(_)
        ));
    }

    #[test]
    fn inspect_reports_invalid_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            inspect_certificate(&dir.path().join("nope.crt")),
            CertStatus::Invalid(_)
        ));
    }
}
