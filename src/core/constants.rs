//! Constants used throughout kubegate.
//!
//! Centralizes magic strings and configuration values.

/// Config directory relative to HOME (~/.kubegate).
pub const CONFIG_DIR: &str = ".kubegate";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Kubeconfig location relative to HOME when the config does not set one.
pub const DEFAULT_KUBECONFIG: &str = ".kube/config";

/// HTTP timeout for retrievers that do not configure one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Scopes requested from an OIDC issuer when none are configured.
pub const DEFAULT_OIDC_SCOPES: &[&str] = &["openid"];

/// User-Agent sent to gateways and issuers.
pub const USER_AGENT: &str = concat!("kubegate/", env!("CARGO_PKG_VERSION"));

/// Environment variable overriding the config file location.
pub const ENV_CONFIG: &str = "KUBEGATE_CONFIG";

/// Environment variables that bypass the credential prompts.
pub const ENV_USERNAME: &str = "KUBEGATE_USERNAME";
pub const ENV_PASSWORD: &str = "KUBEGATE_PASSWORD";
pub const ENV_ID_TOKEN: &str = "KUBEGATE_ID_TOKEN";

/// When set, the OIDC device flow never launches a browser.
pub const ENV_NO_BROWSER: &str = "KUBEGATE_NO_BROWSER";
