//! HTTP plumbing shared by retrievers.
//!
//! Retrievers are synchronous; each call builds a current-thread runtime and
//! blocks on an async `reqwest` request.

use std::path::Path;
use std::time::Duration;

use crate::core::constants;
use crate::error::RetrieveError;

/// Runtime for a single retrieval.
pub(super) fn runtime() -> Result<tokio::runtime::Runtime, RetrieveError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RetrieveError::Unavailable(format!("failed to create runtime: {}", e)))
}

/// HTTP client with the retriever's timeout, optionally trusting an extra CA.
pub(super) fn client(timeout_secs: u64, ca_file: Option<&Path>) -> Result<reqwest::Client, RetrieveError> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(constants::USER_AGENT);

    if let Some(path) = ca_file {
        let pem = read_ca(path)?;
        let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
            RetrieveError::Target(format!("invalid CA certificate {}: {}", path.display(), e))
        })?;
        builder = builder.add_root_certificate(cert);
    }

    builder
        .build()
        .map_err(|e| RetrieveError::Unavailable(format!("failed to create HTTP client: {}", e)))
}

/// Read a PEM bundle from disk.
pub(super) fn read_ca(path: &Path) -> Result<Vec<u8>, RetrieveError> {
    std::fs::read(path)
        .map_err(|e| RetrieveError::Target(format!("failed to read CA file {}: {}", path.display(), e)))
}

/// Transport-level failures are never an identity rejection.
pub(super) fn transport_error(err: reqwest::Error) -> RetrieveError {
    if err.is_timeout() {
        RetrieveError::Unavailable(format!("request timed out: {}", err))
    } else if err.is_connect() {
        RetrieveError::Unavailable(format!("connection failed: {}", err))
    } else {
        RetrieveError::Unavailable(err.to_string())
    }
}

/// Short, single-line excerpt of a response body for error messages.
pub(super) fn excerpt(body: &str) -> String {
    const MAX: usize = 200;
    let line = body.trim().lines().next().unwrap_or_default();
    if line.chars().count() > MAX {
        format!("{}...", line.chars().take(MAX).collect::<String>())
    } else {
        line.to_string()
    }
}
