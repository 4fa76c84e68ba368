//! Retriever selection by provider type.

use std::collections::BTreeMap;
use tracing::debug;

use super::{Oidc, Osprey, Retriever};
use crate::core::config::LoginConfig;
use crate::core::domain::ProviderType;
use crate::error::LoginError;

/// Registry of retrievers keyed by provider type.
///
/// Built once per run. Only providers with a config section are registered,
/// so a target naming an unconfigured provider fails at lookup.
#[derive(Default)]
pub struct RetrieverFactory {
    retrievers: BTreeMap<ProviderType, Box<dyn Retriever>>,
}

impl RetrieverFactory {
    /// An empty factory; every lookup fails until retrievers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a retriever for every configured provider.
    pub fn from_config(config: &LoginConfig) -> Self {
        let mut factory = Self::new();

        if let Some(settings) = &config.providers.osprey {
            debug!("registering osprey retriever");
            factory.register(ProviderType::Osprey, Box::new(Osprey::new(settings.clone())));
        }
        if let Some(settings) = &config.providers.oidc {
            debug!(interactive = config.interactive, "registering oidc retriever");
            factory.register(
                ProviderType::Oidc,
                Box::new(Oidc::new(settings.clone(), config.interactive)),
            );
        }

        factory
    }

    /// Register (or replace) the retriever for a provider.
    pub fn register(&mut self, provider: ProviderType, retriever: Box<dyn Retriever>) {
        self.retrievers.insert(provider, retriever);
    }

    /// Retriever for a provider.
    ///
    /// # Errors
    ///
    /// `LoginError::UnsupportedProvider` if nothing is registered for it.
    pub fn get(&self, provider: ProviderType) -> Result<&dyn Retriever, LoginError> {
        self.retrievers
            .get(&provider)
            .map(|r| r.as_ref())
            .ok_or(LoginError::UnsupportedProvider(provider))
    }
}
