use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported federated identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityProvider {
    #[serde(rename = "azure-ad")]
    AzureAd,
    #[serde(rename = "google")]
    Google,
}

impl IdentityProvider {
    /// The provider slug as persisted in account and session rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AzureAd => "azure-ad",
            Self::Google => "google",
        }
    }
}

impl std::fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdentityProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "azure-ad" => Ok(Self::AzureAd),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown identity provider: {other}")),
        }
    }
}

/// A persisted authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: Uuid,
    pub provider: IdentityProvider,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The per-request enriched view of a session's user.
///
/// Rebuilt from the user record plus a single account lookup on every
/// session read; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    /// Provider slug from the user's first linked account, or `"unknown"`.
    pub provider: String,
}

/// Provider-agnostic claims extracted from an OIDC ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcClaims {
    /// Provider's unique user identifier.
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Profile picture URL, when the provider supplies one.
    pub picture: Option<String>,
    pub provider: IdentityProvider,
}

/// PKCE and CSRF state persisted between login initiation and callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFlow {
    pub pkce_verifier: String,
    pub provider: IdentityProvider,
    pub created_at: DateTime<Utc>,
    /// Validated relative URL to redirect to after a successful sign-in.
    pub callback_url: Option<String>,
}
