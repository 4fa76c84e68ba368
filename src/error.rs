//! Error types.
//!
//! Errors are grouped by the stage that produces them. The login
//! orchestrator only branches on [`LoginError`] and
//! [`RetrieveError::is_fatal`]; everything else is surfaced to the user.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::domain::ProviderType;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Errors loading or validating the login configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unable to determine home directory")]
    NoHome,

    #[error("failed to read config: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    #[error("context name '{context}' is used by both '{first}' and '{second}'")]
    ContextCollision {
        context: String,
        first: String,
        second: String,
    },

    #[error("default group '{0}' has no targets")]
    UnknownDefaultGroup(String),
}

/// Run-level login failures.
///
/// `UnknownGroup` and `NoDefaultGroup` happen before any retrieval.
/// `UnsupportedProvider` and `Unauthenticated` abort the run part-way.
/// `PartialFailure` is reported once every target has been attempted.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("group not found: {0:?}")]
    UnknownGroup(String),

    #[error("no group requested and no default group configured")]
    NoDefaultGroup,

    #[error("no retriever configured for provider '{0}'")]
    UnsupportedProvider(ProviderType),

    #[error("failed to log in to {target}: {reason}")]
    Unauthenticated { target: String, reason: String },

    #[error("failed to update credentials for some targets: {}", .failed.join(", "))]
    PartialFailure { failed: Vec<String> },
}

/// Failure retrieving credentials for a single target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrieveError {
    /// The identity authority explicitly rejected the user's credentials.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Transport failure, timeout or a response that could not be understood.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// User input was required but could not be read.
    #[error("{0}")]
    Prompt(String),

    /// The target's own settings are unusable (e.g. unreadable CA file).
    #[error("invalid target settings: {0}")]
    Target(String),
}

impl RetrieveError {
    /// Whether this failure must stop the run.
    ///
    /// A rejected identity will be rejected for every other target too.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }
}

/// Failure persisting credentials to the kubeconfig.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("unable to determine home directory")]
    NoHome,

    #[error("failed to read kubeconfig {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse kubeconfig: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to serialize kubeconfig: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("failed to write kubeconfig {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
