//! Kubeconfig-backed sink.
//!
//! For a target `t` with aliases `a, b` an update writes:
//!
//! ```yaml
//! clusters:
//! - name: t
//!   cluster: {server: ..., certificate-authority-data: ...}
//! users:
//! - name: t
//!   user: {auth-provider: {name: oidc, config: {...}}}
//! contexts:
//! - name: t        # and one each for a, b
//!   context: {cluster: t, user: t}
//! ```
//!
//! Entries are replaced by name; everything else in the file is kept,
//! including keys this module does not know about.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Sink;
use crate::core::domain::{AuthMaterial, Credential};
use crate::error::SinkError;

/// Kubeconfig document. Only the lists we merge into are typed.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    api_version: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    clusters: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    users: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    contexts: Vec<NamedEntry>,
    #[serde(
        rename = "current-context",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    current_context: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            clusters: Vec::new(),
            users: Vec::new(),
            contexts: Vec::new(),
            current_context: None,
            extra: BTreeMap::new(),
        }
    }
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "Config".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<NamedEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NamedEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{name: ..., <kind>: {...}, ...}` list item.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NamedEntry {
    name: String,
    #[serde(flatten)]
    body: BTreeMap<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterBody<'a> {
    server: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate_authority_data: Option<String>,
}

#[derive(Serialize)]
struct ContextBody<'a> {
    cluster: &'a str,
    user: &'a str,
}

/// Exactly one of the fields is set. Kept as plain keys: an enum would be
/// written as a YAML tag, which kubectl does not read.
#[derive(Default, Serialize)]
#[serde(rename_all = "kebab-case")]
struct UserBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_provider: Option<AuthProvider<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

#[derive(Serialize)]
struct AuthProvider<'a> {
    name: &'static str,
    config: OidcConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct OidcConfig<'a> {
    client_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
    id_token: &'a str,
    idp_issuer_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    idp_certificate_authority_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

/// A kubeconfig file being merged into.
#[derive(Debug)]
pub struct Kubeconfig {
    path: PathBuf,
    doc: Document,
}

impl Kubeconfig {
    /// Load an existing kubeconfig. A missing or empty file starts empty.
    ///
    /// # Errors
    ///
    /// `SinkError::Read` if the file exists but can't be read,
    /// `SinkError::Parse` if it isn't a kubeconfig.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        debug!(path = %path.display(), "loading kubeconfig");

        let doc = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| SinkError::Read {
                path: path.clone(),
                source,
            })?;
            if contents.trim().is_empty() {
                Document::default()
            } else {
                serde_yaml::from_str(&contents).map_err(SinkError::Parse)?
            }
        } else {
            Document::default()
        };

        debug!(
            clusters = doc.clusters.len(),
            users = doc.users.len(),
            contexts = doc.contexts.len(),
            "kubeconfig loaded"
        );
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge a target's credential into the in-memory document.
    pub fn merge(
        &mut self,
        target: &str,
        aliases: &[String],
        credential: &Credential,
    ) -> Result<(), SinkError> {
        let cluster = ClusterBody {
            server: &credential.server,
            certificate_authority_data: encode(&credential.ca_data),
        };
        upsert(&mut self.doc.clusters, target, "cluster", to_value(&cluster)?);

        let user = match &credential.auth {
            AuthMaterial::Oidc {
                issuer_url,
                client_id,
                client_secret,
                id_token,
                refresh_token,
                issuer_ca,
            } => UserBody {
                auth_provider: Some(AuthProvider {
                    name: "oidc",
                    config: OidcConfig {
                        client_id,
                        client_secret: client_secret.as_deref(),
                        id_token,
                        idp_issuer_url: issuer_url,
                        idp_certificate_authority_data: issuer_ca.as_deref().and_then(encode),
                        refresh_token: refresh_token.as_deref(),
                    },
                }),
                ..Default::default()
            },
            AuthMaterial::Token { token } => UserBody {
                token: Some(token),
                ..Default::default()
            },
        };
        upsert(&mut self.doc.users, target, "user", to_value(&user)?);

        let context = to_value(&ContextBody {
            cluster: target,
            user: target,
        })?;
        for name in std::iter::once(target).chain(aliases.iter().map(String::as_str)) {
            upsert(&mut self.doc.contexts, name, "context", context.clone());
        }

        debug!(cluster = target, aliases = aliases.len(), "merged credential");
        Ok(())
    }

    /// Write the document back to disk (mode 0600 on Unix).
    pub fn save(&self) -> Result<(), SinkError> {
        let contents = serde_yaml::to_string(&self.doc).map_err(SinkError::Serialize)?;
        let write_err = |source: std::io::Error| SinkError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, contents).map_err(write_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(write_err)?;
        }

        debug!(path = %self.path.display(), "kubeconfig saved");
        Ok(())
    }

    /// API server recorded for a cluster.
    pub fn server(&self, cluster: &str) -> Option<&str> {
        find(&self.doc.clusters, cluster)?
            .body
            .get("cluster")?
            .get("server")?
            .as_str()
    }

    /// Cluster a context points at.
    pub fn context_cluster(&self, context: &str) -> Option<&str> {
        find(&self.doc.contexts, context)?
            .body
            .get("context")?
            .get("cluster")?
            .as_str()
    }

    /// Raw `user` body for a user entry.
    pub fn user(&self, name: &str) -> Option<&Value> {
        find(&self.doc.users, name)?.body.get("user")
    }

    /// Context names in file order.
    pub fn contexts(&self) -> Vec<&str> {
        self.doc.contexts.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn current_context(&self) -> Option<&str> {
        self.doc.current_context.as_deref().filter(|c| !c.is_empty())
    }
}

impl Sink for Kubeconfig {
    fn update(
        &mut self,
        target: &str,
        aliases: &[String],
        credential: &Credential,
    ) -> Result<(), SinkError> {
        self.merge(target, aliases, credential)?;
        self.save()
    }
}

fn find<'a>(entries: &'a [NamedEntry], name: &str) -> Option<&'a NamedEntry> {
    entries.iter().find(|e| e.name == name)
}

/// Replace `key` in the entry called `name`, appending the entry if missing.
fn upsert(entries: &mut Vec<NamedEntry>, name: &str, key: &str, value: Value) {
    match entries.iter_mut().find(|e| e.name == name) {
        Some(entry) => {
            entry.body.insert(key.to_string(), value);
        }
        None => entries.push(NamedEntry {
            name: name.to_string(),
            body: BTreeMap::from([(key.to_string(), value)]),
        }),
    }
}

fn encode(data: &[u8]) -> Option<String> {
    (!data.is_empty()).then(|| BASE64.encode(data))
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, SinkError> {
    serde_yaml::to_value(value).map_err(SinkError::Serialize)
}
