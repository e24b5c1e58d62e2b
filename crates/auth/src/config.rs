use std::time::Duration;

use url::Url;

/// Configuration for a client-id/client-secret OIDC provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Url,
}

/// Azure AD configuration (tenant-scoped issuer).
#[derive(Debug, Clone)]
pub struct AzureAdConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    /// Directory (tenant) id; `common` accepts any tenant.
    pub tenant_id: String,
    pub redirect_uri: Url,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub azure_ad: Option<AzureAdConfig>,
    pub google: Option<ProviderConfig>,
    pub session_ttl: Duration,
    pub base_url: Url,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_BASE_URL`: Base URL for callback redirects (default: `http://localhost:3000`)
    /// - `AZURE_AD_CLIENT_ID`: Azure AD client ID (optional, enables Azure AD)
    /// - `AZURE_AD_CLIENT_SECRET`: Azure AD client secret (required if Azure AD enabled)
    /// - `AZURE_AD_TENANT_ID`: Azure AD tenant (default: `common`)
    /// - `GOOGLE_CLIENT_ID`: Google OAuth client ID (optional, enables Google)
    /// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret (required if Google enabled)
    /// - `SESSION_TTL_DAYS`: Session TTL in days (default: 7)
    /// - `COOKIE_SECURE`: Whether to set the secure flag on cookies (default: true)
    ///
    /// # Errors
    ///
    /// Returns an error if a provider is partially configured (client id
    /// present without its secret).
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let base_url: Url = std::env::var("AUTH_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse()
            .expect("AUTH_BASE_URL must be a valid URL");

        let azure_ad = match std::env::var("AZURE_AD_CLIENT_ID") {
            Ok(client_id) => Some(AzureAdConfig {
                client_id,
                client_secret: Some(std::env::var("AZURE_AD_CLIENT_SECRET")?),
                tenant_id: std::env::var("AZURE_AD_TENANT_ID")
                    .unwrap_or_else(|_| "common".to_string()),
                redirect_uri: base_url.join("/auth/azure-ad/callback").unwrap(),
            }),
            Err(_) => None,
        };

        let google = match std::env::var("GOOGLE_CLIENT_ID") {
            Ok(client_id) => Some(ProviderConfig {
                client_id,
                client_secret: Some(std::env::var("GOOGLE_CLIENT_SECRET")?),
                redirect_uri: base_url.join("/auth/google/callback").unwrap(),
            }),
            Err(_) => None,
        };

        let session_ttl = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(|days| Duration::from_secs(days * 24 * 60 * 60))
            .unwrap_or(Duration::from_secs(7 * 24 * 60 * 60));

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            azure_ad,
            google,
            session_ttl,
            base_url,
            cookie_name: "vibes_session".to_string(),
            cookie_secure,
        })
    }

    /// Configuration with no providers, for tests and demo mode.
    pub fn disabled() -> Self {
        Self {
            azure_ad: None,
            google: None,
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            base_url: "http://localhost:3000".parse().expect("static URL"),
            cookie_name: "vibes_session".to_string(),
            cookie_secure: false,
        }
    }
}
