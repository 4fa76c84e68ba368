//! Osprey gateway retriever.
//!
//! An Osprey gateway sits in front of a cluster and trades the user's
//! username and password for the cluster's API endpoint, its CA and a set of
//! OIDC tokens:
//!
//! ```text
//! POST {server}/access-token
//! Authorization: Basic base64(user:password)
//! ```
//!
//! The credentials are asked for once per run and reused for every osprey
//! target in the group.

use dialoguer::{Input, Password};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::cell::OnceCell;
use std::io::{self, IsTerminal};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{http, Retriever};
use crate::core::config::OspreySettings;
use crate::core::constants;
use crate::core::domain::{AuthMaterial, Credential, Target};
use crate::error::RetrieveError;

/// Retriever for Osprey gateways.
pub struct Osprey {
    settings: OspreySettings,
    login: OnceCell<BasicAuth>,
}

struct BasicAuth {
    username: String,
    password: Zeroizing<String>,
}

/// `/access-token` response body.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    cluster: ClusterInfo,
    token: TokenInfo,
}

#[derive(Debug, Deserialize)]
struct ClusterInfo {
    #[serde(default)]
    name: String,
    api_server_url: String,
    #[serde(default)]
    api_server_ca: String,
}

#[derive(Deserialize)]
struct TokenInfo {
    id_token: String,
    client_id: String,
    #[serde(default)]
    client_secret: Option<String>,
    issuer_url: String,
    #[serde(default)]
    issuer_ca: Option<String>,
}

impl std::fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInfo")
            .field("client_id", &self.client_id)
            .field("issuer_url", &self.issuer_url)
            .finish_non_exhaustive()
    }
}

impl Osprey {
    pub fn new(settings: OspreySettings) -> Self {
        Self {
            settings,
            login: OnceCell::new(),
        }
    }

    /// Pre-seed credentials instead of prompting.
    pub fn with_credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        let _ = self.login.set(BasicAuth {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        });
        self
    }

    fn basic_auth(&self) -> Result<&BasicAuth, RetrieveError> {
        if let Some(auth) = self.login.get() {
            return Ok(auth);
        }
        let auth = prompt_basic_auth()?;
        Ok(self.login.get_or_init(|| auth))
    }
}

impl Retriever for Osprey {
    fn name(&self) -> &'static str {
        "osprey"
    }

    fn retrieve(&self, target: &Target) -> Result<Credential, RetrieveError> {
        let auth = self.basic_auth()?;
        let client = http::client(self.settings.timeout_secs, target.ca_file.as_deref())?;
        let url = access_token_url(&target.server);

        debug!(name = %target.name, url = %url, username = %auth.username, "requesting access token");

        let (status, body) = http::runtime()?.block_on(async {
            let response = client
                .post(&url)
                .basic_auth(&auth.username, Some(auth.password.as_str()))
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(http::transport_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(http::transport_error)?;
            Ok::<_, RetrieveError>((status, body))
        })?;

        trace!(name = %target.name, status, body_len = body.len(), "access token response");
        parse_response(status, &body)
    }
}

fn access_token_url(server: &str) -> String {
    format!("{}/access-token", server.trim_end_matches('/'))
}

/// Map a gateway response to a credential or a classified error.
fn parse_response(status: u16, body: &str) -> Result<Credential, RetrieveError> {
    match status {
        200..=299 => {
            let response: AccessTokenResponse = serde_json::from_str(body)
                .map_err(|e| RetrieveError::Unavailable(format!("malformed gateway response: {}", e)))?;
            if response.cluster.api_server_url.is_empty() {
                return Err(RetrieveError::Unavailable(
                    "gateway response has no api_server_url".to_string(),
                ));
            }
            debug!(cluster = %response.cluster.name, "gateway returned cluster details");
            Ok(Credential {
                server: response.cluster.api_server_url,
                ca_data: response.cluster.api_server_ca.into_bytes(),
                auth: AuthMaterial::Oidc {
                    issuer_url: response.token.issuer_url,
                    client_id: response.token.client_id,
                    client_secret: response.token.client_secret.filter(|s| !s.is_empty()),
                    id_token: response.token.id_token,
                    refresh_token: None,
                    issuer_ca: response
                        .token
                        .issuer_ca
                        .filter(|ca| !ca.is_empty())
                        .map(String::into_bytes),
                },
            })
        }
        401 | 403 => {
            let reason = http::excerpt(body);
            Err(RetrieveError::Unauthenticated(if reason.is_empty() {
                "invalid credentials".to_string()
            } else {
                reason
            }))
        }
        _ => Err(RetrieveError::Unavailable(format!(
            "gateway returned {}: {}",
            status,
            http::excerpt(body)
        ))),
    }
}

/// Ask for username and password, or take them from the environment.
fn prompt_basic_auth() -> Result<BasicAuth, RetrieveError> {
    let interactive = io::stdin().is_terminal();

    let username = match env_value(constants::ENV_USERNAME) {
        Some(username) => username,
        None if interactive => Input::new()
            .with_prompt("Username")
            .default(whoami::username())
            .interact_text()
            .map_err(|e| RetrieveError::Prompt(format!("failed to read username: {}", e)))?,
        None => {
            return Err(RetrieveError::Prompt(format!(
                "username required in non-interactive mode (set {})",
                constants::ENV_USERNAME
            )))
        }
    };

    let password = match env_value(constants::ENV_PASSWORD) {
        Some(password) => password,
        None if interactive => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| RetrieveError::Prompt(format!("failed to read password: {}", e)))?,
        None => {
            return Err(RetrieveError::Prompt(format!(
                "password required in non-interactive mode (set {})",
                constants::ENV_PASSWORD
            )))
        }
    };

    Ok(BasicAuth {
        username,
        password: Zeroizing::new(password),
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
