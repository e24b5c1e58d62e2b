//! Shared auth state, constructed once at startup and injected everywhere.

use std::sync::Arc;

use vibes_core::auth::{IdentityProvider, ProviderClient, SessionRepository};
use vibes_core::storage::{AccountRepository, UserRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::{AzureAdProvider, GoogleProvider};

/// Shared state for auth handlers, extractors and the route guard.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionRepository>,
    pub users: Arc<dyn UserRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub config: AuthConfig,
    azure_ad: Option<Arc<dyn ProviderClient>>,
    google: Option<Arc<dyn ProviderClient>>,
}

impl AuthState {
    /// Creates a new `AuthState`, running OIDC discovery for each
    /// configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if provider discovery fails.
    pub async fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        accounts: Arc<dyn AccountRepository>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let azure_ad: Option<Arc<dyn ProviderClient>> = match &config.azure_ad {
            Some(cfg) => Some(Arc::new(AzureAdProvider::new(cfg).await?)),
            None => None,
        };

        let google: Option<Arc<dyn ProviderClient>> = match &config.google {
            Some(cfg) => Some(Arc::new(GoogleProvider::new(cfg).await?)),
            None => None,
        };

        Ok(Self {
            sessions,
            users,
            accounts,
            config,
            azure_ad,
            google,
        })
    }

    /// State without any provider clients, for tests and demo mode where
    /// sessions are created out of band.
    pub fn without_providers(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        accounts: Arc<dyn AccountRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            accounts,
            config,
            azure_ad: None,
            google: None,
        }
    }

    /// Installs a pre-built client for the given provider, replacing any
    /// existing one. Lets callers plug in their own `ProviderClient`
    /// implementations instead of going through discovery.
    #[must_use]
    pub fn with_provider(
        mut self,
        provider: IdentityProvider,
        client: Arc<dyn ProviderClient>,
    ) -> Self {
        match provider {
            IdentityProvider::AzureAd => self.azure_ad = Some(client),
            IdentityProvider::Google => self.google = Some(client),
        }
        self
    }

    /// Gets the client for the given provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotConfigured` if the provider is not enabled.
    pub fn get_provider(
        &self,
        provider: IdentityProvider,
    ) -> Result<&dyn ProviderClient, AuthError> {
        let client = match provider {
            IdentityProvider::AzureAd => self.azure_ad.as_ref(),
            IdentityProvider::Google => self.google.as_ref(),
        };

        client
            .map(|p| p.as_ref())
            .ok_or_else(|| AuthError::ProviderNotConfigured(provider.to_string()))
    }

    /// Whether the given provider has a configured client id.
    pub fn provider_enabled(&self, provider: IdentityProvider) -> bool {
        match provider {
            IdentityProvider::AzureAd => self.config.azure_ad.is_some(),
            IdentityProvider::Google => self.config.google.is_some(),
        }
    }
}
