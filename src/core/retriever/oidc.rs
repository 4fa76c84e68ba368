//! OpenID Connect retriever.
//!
//! Interactive runs use the OAuth 2.0 Device Authorization Grant (RFC 8628):
//! the user is shown a code and a verification URL (opened in the browser
//! when possible) while the retriever polls the issuer's token endpoint.
//! Non-interactive runs ask for an ID token to be pasted instead.
//!
//! The cluster endpoint and CA come from the target itself.

use dialoguer::Password;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use super::{http, Retriever};
use crate::core::config::OidcSettings;
use crate::core::constants;
use crate::core::domain::{AuthMaterial, Credential, Target};
use crate::error::RetrieveError;

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Added to the polling interval when the issuer answers `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// Retriever for plain OIDC issuers.
pub struct Oidc {
    settings: OidcSettings,
    interactive: bool,
}

/// Subset of `/.well-known/openid-configuration` we need.
#[derive(Debug, Deserialize)]
struct Discovery {
    token_endpoint: String,
    #[serde(default)]
    device_authorization_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    verification_uri_complete: Option<String>,
    expires_in: u64,
    #[serde(default = "default_interval")]
    interval: u64,
}

fn default_interval() -> u64 {
    5
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Tokens obtained from the issuer.
struct Tokens {
    id_token: String,
    refresh_token: Option<String>,
}

/// What to do after a non-success token endpoint response.
#[derive(Debug, PartialEq, Eq)]
enum Poll {
    Pending,
    SlowDown,
    Failed(RetrieveError),
}

impl Oidc {
    pub fn new(settings: OidcSettings, interactive: bool) -> Self {
        Self {
            settings,
            interactive,
        }
    }

    fn discovery_url(&self) -> String {
        format!(
            "{}/.well-known/openid-configuration",
            self.settings.issuer_url.trim_end_matches('/')
        )
    }

    /// Run the device authorization grant to completion.
    fn device_flow(&self, target: &Target) -> Result<Tokens, RetrieveError> {
        let client = http::client(self.settings.timeout_secs, None)?;

        http::runtime()?.block_on(async {
            let discovery = self.discover(&client).await?;
            let device_endpoint = discovery.device_authorization_endpoint.ok_or_else(|| {
                RetrieveError::Unavailable(format!(
                    "issuer {} does not support device authorization",
                    self.settings.issuer_url
                ))
            })?;

            let device = self.request_device_code(&client, &device_endpoint).await?;
            announce(target, &device);
            self.poll_for_tokens(&client, &discovery.token_endpoint, &device)
                .await
        })
    }

    async fn discover(&self, client: &reqwest::Client) -> Result<Discovery, RetrieveError> {
        let url = self.discovery_url();
        debug!(url = %url, "fetching issuer discovery document");

        let response = client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(http::transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(http::transport_error)?;

        if !status.is_success() {
            return Err(RetrieveError::Unavailable(format!(
                "discovery returned {}: {}",
                status,
                http::excerpt(&body)
            )));
        }
        serde_json::from_str(&body)
            .map_err(|e| RetrieveError::Unavailable(format!("malformed discovery document: {}", e)))
    }

    async fn request_device_code(
        &self,
        client: &reqwest::Client,
        endpoint: &str,
    ) -> Result<DeviceCodeResponse, RetrieveError> {
        let scope = self.settings.scopes.join(" ");
        let mut form = vec![
            ("client_id", self.settings.client_id.as_str()),
            ("scope", scope.as_str()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        debug!(endpoint = %endpoint, scope = %scope, "requesting device code");
        let response = client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(http::transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(http::transport_error)?;

        if !(200..300).contains(&status) {
            return Err(match classify_token_error(status, &body) {
                Poll::Failed(err) => err,
                // Pending makes no sense before a code exists.
                Poll::Pending | Poll::SlowDown => RetrieveError::Unavailable(format!(
                    "device authorization returned {}: {}",
                    status,
                    http::excerpt(&body)
                )),
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| RetrieveError::Unavailable(format!("malformed device code response: {}", e)))
    }

    async fn poll_for_tokens(
        &self,
        client: &reqwest::Client,
        token_endpoint: &str,
        device: &DeviceCodeResponse,
    ) -> Result<Tokens, RetrieveError> {
        let deadline = poll_deadline(Instant::now(), device.expires_in)?;
        let mut interval = Duration::from_secs(device.interval.max(1));

        let mut form = vec![
            ("grant_type", DEVICE_CODE_GRANT),
            ("device_code", device.device_code.as_str()),
            ("client_id", self.settings.client_id.as_str()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(interval.min(remaining)).await;
            if Instant::now() >= deadline {
                return Err(RetrieveError::Unauthenticated(
                    "device code expired before authorization completed".to_string(),
                ));
            }

            let response = client
                .post(token_endpoint)
                .header(ACCEPT, "application/json")
                .form(&form)
                .send()
                .await
                .map_err(http::transport_error)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(http::transport_error)?;
            trace!(status, body_len = body.len(), "token poll response");

            if (200..300).contains(&status) {
                return parse_tokens(&body);
            }
            match classify_token_error(status, &body) {
                Poll::Pending => {}
                Poll::SlowDown => {
                    interval = interval.checked_add(SLOW_DOWN_STEP).ok_or_else(|| {
                        RetrieveError::Unavailable("polling interval out of range".to_string())
                    })?;
                    debug!(interval_secs = interval.as_secs(), "issuer asked to slow down");
                }
                Poll::Failed(err) => return Err(err),
            }
        }
    }

    /// Read an ID token from the environment or a hidden prompt.
    fn pasted_token(&self, target: &Target) -> Result<Tokens, RetrieveError> {
        if let Some(token) = std::env::var(constants::ENV_ID_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty())
        {
            return Ok(Tokens {
                id_token: token.trim().to_string(),
                refresh_token: None,
            });
        }

        if !io::stdin().is_terminal() {
            return Err(RetrieveError::Prompt(format!(
                "ID token required in non-interactive mode (set {})",
                constants::ENV_ID_TOKEN
            )));
        }

        eprintln!(
            "Obtain an ID token for {} from {}",
            target.name, self.settings.issuer_url
        );
        let token = Password::new()
            .with_prompt(format!("Paste the ID token for {}", target.name))
            .interact()
            .map_err(|e| RetrieveError::Prompt(format!("failed to read token: {}", e)))?;

        let token = token.trim();
        if token.is_empty() {
            return Err(RetrieveError::Prompt("no token provided".to_string()));
        }
        Ok(Tokens {
            id_token: token.to_string(),
            refresh_token: None,
        })
    }
}

impl Retriever for Oidc {
    fn name(&self) -> &'static str {
        "oidc"
    }

    fn retrieve(&self, target: &Target) -> Result<Credential, RetrieveError> {
        let ca_data = match &target.ca_file {
            Some(path) => http::read_ca(path)?,
            None => Vec::new(),
        };

        let tokens = if self.interactive {
            self.device_flow(target)?
        } else {
            self.pasted_token(target)?
        };

        Ok(Credential {
            server: target.server.clone(),
            ca_data,
            auth: AuthMaterial::Oidc {
                issuer_url: self.settings.issuer_url.clone(),
                client_id: self.settings.client_id.clone(),
                client_secret: self.settings.client_secret.clone(),
                id_token: tokens.id_token,
                refresh_token: tokens.refresh_token,
                issuer_ca: None,
            },
        })
    }
}

/// Show the user code and try to open the verification page.
fn announce(target: &Target, device: &DeviceCodeResponse) {
    let url = device
        .verification_uri_complete
        .as_deref()
        .unwrap_or(&device.verification_uri);

    eprintln!("To log in to {}, visit:", target.name);
    eprintln!("  {}", url);
    eprintln!("and enter the code: {}", device.user_code);

    if std::env::var_os(constants::ENV_NO_BROWSER).is_none() {
        if let Err(e) = open::that(url) {
            warn!(error = %e, "failed to open browser");
        }
    }
}

/// When a device code stops being valid.
fn poll_deadline(now: Instant, expires_in: u64) -> Result<Instant, RetrieveError> {
    now.checked_add(Duration::from_secs(expires_in)).ok_or_else(|| {
        RetrieveError::Unavailable(format!(
            "device code lifetime out of range: {}s",
            expires_in
        ))
    })
}

fn parse_tokens(body: &str) -> Result<Tokens, RetrieveError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| RetrieveError::Unavailable(format!("malformed token response: {}", e)))?;
    let id_token = response
        .id_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RetrieveError::Unavailable("token response has no id_token".to_string()))?;
    Ok(Tokens {
        id_token,
        refresh_token: response.refresh_token,
    })
}

/// Classify an error response from the device or token endpoint.
fn classify_token_error(status: u16, body: &str) -> Poll {
    let Ok(error) = serde_json::from_str::<TokenErrorResponse>(body) else {
        let reason = format!("issuer returned {}: {}", status, http::excerpt(body));
        return Poll::Failed(match status {
            401 | 403 => RetrieveError::Unauthenticated(reason),
            _ => RetrieveError::Unavailable(reason),
        });
    };

    let reason = match &error.error_description {
        Some(description) => format!("{}: {}", error.error, description),
        None => error.error.clone(),
    };

    match error.error.as_str() {
        "authorization_pending" => Poll::Pending,
        "slow_down" => Poll::SlowDown,
        "access_denied" | "expired_token" | "invalid_grant" => {
            Poll::Failed(RetrieveError::Unauthenticated(reason))
        }
        // invalid_client, unauthorized_client and unknown codes point at the client setup.
        _ => Poll::Failed(RetrieveError::Unavailable(reason)),
    }
}
