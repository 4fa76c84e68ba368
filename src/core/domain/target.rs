//! Cluster targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Provider family a target authenticates through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Osprey gateway: username/password exchanged for cluster info and tokens.
    Osprey,
    /// Plain OpenID Connect issuer (device code or pasted ID token).
    Oidc,
}

impl ProviderType {
    /// Tag used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Osprey => "osprey",
            Self::Oidc => "oidc",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cluster endpoint the user wants credentials for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Target {
    /// Unique target name; also the kubeconfig cluster/user/context name.
    pub name: String,
    /// Provider used to retrieve credentials.
    pub provider: ProviderType,
    /// Gateway URL (osprey) or API server URL (oidc).
    pub server: String,
    /// Extra kubeconfig context names pointing at this target.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Groups this target belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
    /// PEM bundle for the gateway (osprey) or the cluster (oidc).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<PathBuf>,
}

impl Target {
    /// Create a target with no aliases, groups or CA.
    pub fn new(name: impl Into<String>, provider: ProviderType, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider,
            server: server.into(),
            aliases: Vec::new(),
            groups: Vec::new(),
            ca_file: None,
        }
    }

    /// Builder-style alias setter.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }

    /// Name followed by its aliases, e.g. `prod | p | production`.
    pub fn display_name(&self) -> String {
        if self.has_aliases() {
            format!("{} | {}", self.name, self.aliases.join(" | "))
        } else {
            self.name.clone()
        }
    }

    /// Every kubeconfig context name this target owns.
    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
