//! Credentials returned by a retriever.

/// Normalized cluster access data for one target.
///
/// Handed straight to the sink; never kept around after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Kubernetes API server URL.
    pub server: String,
    /// PEM encoded cluster CA; empty when the server uses a public CA.
    pub ca_data: Vec<u8>,
    pub auth: AuthMaterial,
}

/// Authentication material for the kubeconfig user entry.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMaterial {
    /// OIDC auth-provider configuration.
    Oidc {
        issuer_url: String,
        client_id: String,
        client_secret: Option<String>,
        id_token: String,
        refresh_token: Option<String>,
        /// PEM encoded CA for the issuer.
        issuer_ca: Option<Vec<u8>>,
    },
    /// Static bearer token.
    Token { token: String },
}

impl std::fmt::Debug for AuthMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens stay out of logs.
        match self {
            Self::Oidc {
                issuer_url,
                client_id,
                ..
            } => f
                .debug_struct("Oidc")
                .field("issuer_url", issuer_url)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            Self::Token { .. } => f.debug_struct("Token").finish_non_exhaustive(),
        }
    }
}
