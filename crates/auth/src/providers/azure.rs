//! Azure AD OIDC provider implementation.
//!
//! Uses the v2.0 endpoint with a tenant-scoped issuer. The `common` tenant
//! accepts accounts from any directory, at the cost of issuer validation
//! being per-tenant (the discovery document carries a templated issuer).

use async_trait::async_trait;
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};
use url::Url;
use vibes_core::auth::{
    generate_state, AuthError, IdentityProvider, OidcClaims, ProviderClient, Result,
};

use super::ConfiguredCoreClient;
use crate::config::AzureAdConfig;

/// Azure AD OIDC provider.
pub struct AzureAdProvider {
    client: ConfiguredCoreClient,
    http_client: reqwest::Client,
}

impl AzureAdProvider {
    /// Create a new Azure AD provider by discovering the tenant's metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the redirect URI is invalid.
    pub async fn new(config: &AzureAdConfig) -> Result<Self> {
        let issuer_url = IssuerUrl::new(format!(
            "https://login.microsoftonline.com/{}/v2.0",
            config.tenant_id
        ))
        .map_err(|e| AuthError::Provider(e.to_string()))?;

        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(format!("failed to build HTTP client: {e}")))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            config.client_secret.clone().map(ClientSecret::new),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.to_string())
                .map_err(|e| AuthError::Provider(e.to_string()))?,
        );

        Ok(Self {
            client,
            http_client,
        })
    }
}

#[async_trait]
impl ProviderClient for AzureAdProvider {
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url> {
        let state_owned = state.to_string();
        let pkce_challenge_owned = pkce_challenge.to_string();

        let (auth_url, _csrf_token, _nonce) = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state_owned),
                || Nonce::new(generate_state()),
            )
            .add_scope(Scope::new("openid".to_string()))
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .add_extra_param("code_challenge", pkce_challenge_owned)
            .add_extra_param("code_challenge_method", "S256")
            .url();

        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<OidcClaims> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthError::InvalidToken("no ID token in response".to_string()))?;

        let claims = id_token
            .claims(&self.client.id_token_verifier(), |_: Option<&Nonce>| Ok(()))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        // Azure puts the sign-in address in preferred_username when the
        // email claim is absent (work/school accounts without mail).
        let email = claims
            .email()
            .map(|e| e.to_string())
            .or_else(|| claims.preferred_username().map(|u| u.to_string()));

        Ok(OidcClaims {
            subject: claims.subject().to_string(),
            email,
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.to_string()),
            picture: None,
            provider: IdentityProvider::AzureAd,
        })
    }

    fn provider(&self) -> IdentityProvider {
        IdentityProvider::AzureAd
    }
}
