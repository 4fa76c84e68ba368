//! Login configuration.
//!
//! Reads `~/.kubegate/config.toml`, validates it and groups targets by the
//! `groups` each target declares.

use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::constants;
use crate::core::domain::{Group, Target};
use crate::error::{ConfigError, Result};

/// On-disk layout of the config file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    kubeconfig: Option<String>,
    #[serde(default)]
    default_group: Option<String>,
    #[serde(default)]
    providers: ProviderSettings,
    #[serde(default)]
    targets: Vec<Target>,
}

/// Shared provider settings. A provider is only usable when its section exists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    #[serde(default)]
    pub osprey: Option<OspreySettings>,
    #[serde(default)]
    pub oidc: Option<OidcSettings>,
}

/// `[providers.osprey]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OspreySettings {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for OspreySettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

/// `[providers.oidc]`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OidcSettings {
    pub issuer_url: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_scopes() -> Vec<String> {
    constants::DEFAULT_OIDC_SCOPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Validated configuration for one login run.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Groups keyed by name.
    pub groups: BTreeMap<String, Group>,
    /// Group used when none is requested.
    pub default_group: Option<String>,
    /// Kubeconfig file the sink merges into.
    pub kubeconfig: PathBuf,
    /// Whether retrievers may drive a browser; otherwise tokens are pasted.
    pub interactive: bool,
    pub providers: ProviderSettings,
}

impl LoginConfig {
    /// Default config location (`~/.kubegate/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        Ok(home.join(constants::CONFIG_DIR).join(constants::CONFIG_FILE))
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::Parse` if the TOML is malformed, or a validation error.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate config contents.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(ConfigError::Parse)?;

        let kubeconfig = match file.kubeconfig.as_deref() {
            Some(path) => expand_home(path)?,
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHome)?
                .join(constants::DEFAULT_KUBECONFIG),
        };

        let mut targets = file.targets;
        for target in &mut targets {
            if let Some(ca) = target.ca_file.take() {
                target.ca_file = Some(expand_home(&ca.to_string_lossy())?);
            }
        }

        let config = Self {
            groups: build_groups(targets)?,
            default_group: file.default_group,
            kubeconfig,
            interactive: true,
            providers: file.providers,
        };
        config.validate()?;

        debug!(
            groups = config.groups.len(),
            default_group = ?config.default_group,
            kubeconfig = %config.kubeconfig.display(),
            "config loaded"
        );

        Ok(config)
    }

    /// Checks that the default group, if any, exists.
    fn validate(&self) -> Result<()> {
        if let Some(default) = &self.default_group {
            if !self.groups.contains_key(default) {
                return Err(ConfigError::UnknownDefaultGroup(default.clone()).into());
            }
        }
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }
}

/// Validate targets and collect them into groups, keeping declaration order.
///
/// Every kubeconfig context name (target name or alias) belongs to exactly
/// one target. A group listed twice by the same target counts once.
fn build_groups(targets: Vec<Target>) -> Result<BTreeMap<String, Group>> {
    let mut seen = HashSet::new();
    let mut contexts: HashMap<String, String> = HashMap::new();
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for mut target in targets {
        validate_target(&target)?;
        if !seen.insert(target.name.clone()) {
            return Err(ConfigError::DuplicateTarget(target.name).into());
        }
        for context in target.context_names() {
            match contexts.entry(context.to_string()) {
                Entry::Occupied(owner) if *owner.get() != target.name => {
                    return Err(ConfigError::ContextCollision {
                        context: context.to_string(),
                        first: owner.get().clone(),
                        second: target.name.clone(),
                    }
                    .into());
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(slot) => {
                    slot.insert(target.name.clone());
                }
            }
        }

        let mut listed = HashSet::new();
        target.groups.retain(|g| listed.insert(g.clone()));
        if target.groups.is_empty() {
            warn!(name = %target.name, "target belongs to no group and can never be logged in to");
            continue;
        }
        for name in &target.groups {
            groups
                .entry(name.clone())
                .or_insert_with(|| Group::new(name.clone(), Vec::new()))
                .push(target.clone());
        }
    }

    Ok(groups)
}

fn validate_target(target: &Target) -> Result<()> {
    if target.name.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "targets.name",
            reason: "target name cannot be empty".to_string(),
        }
        .into());
    }
    if target.server.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "targets.server",
            reason: format!("target '{}' has no server", target.name),
        }
        .into());
    }
    if let Some(alias) = target.aliases.iter().find(|a| a.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "targets.aliases",
            reason: format!("target '{}' has an empty alias {:?}", target.name, alias),
        }
        .into());
    }
    if target.groups.iter().any(|g| g.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "targets.groups",
            reason: format!("target '{}' has an empty group name", target.name),
        }
        .into());
    }
    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return Ok(dirs::home_dir().ok_or(ConfigError::NoHome)?);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir().ok_or(ConfigError::NoHome)?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}
