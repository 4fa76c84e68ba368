//! Credential retrieval.
//!
//! Each provider family implements [`Retriever`]. The login orchestrator
//! never talks to a provider directly; it asks the [`RetrieverFactory`] for
//! the retriever registered against a target's [`ProviderType`].
//!
//! ## Providers
//!
//! - **osprey**: username/password exchanged at an Osprey gateway for
//!   cluster details and OIDC tokens.
//! - **oidc**: OAuth 2.0 device authorization grant against an OIDC issuer,
//!   or a pasted ID token in non-interactive mode.
//!
//! ## Adding a New Provider
//!
//! 1. Add a variant to `ProviderType`
//! 2. Implement the `Retriever` trait in a new file
//! 3. Add a settings section to `ProviderSettings`
//! 4. Register it in `RetrieverFactory::from_config`
//!
//! [`ProviderType`]: crate::core::domain::ProviderType

mod factory;
mod http;
pub mod oidc;
pub mod osprey;

pub use factory::RetrieverFactory;
pub use oidc::Oidc;
pub use osprey::Osprey;

use crate::core::domain::{Credential, Target};
use crate::error::RetrieveError;

/// Provider-specific credential retrieval for a single target.
///
/// Implementations may block on network I/O or on the user (browser, terminal
/// prompt). They must not write to the kubeconfig; results flow back through
/// the orchestrator.
pub trait Retriever {
    /// Provider name for logs.
    fn name(&self) -> &'static str;

    /// Authenticate against the target and return its cluster credentials.
    ///
    /// # Errors
    ///
    /// `RetrieveError::Unauthenticated` when the identity authority rejects
    /// the user, `RetrieveError::Unavailable` for transport problems or
    /// malformed responses, and `Prompt`/`Target` for local problems.
    fn retrieve(&self, target: &Target) -> Result<Credential, RetrieveError>;
}
