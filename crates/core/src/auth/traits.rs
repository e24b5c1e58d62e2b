use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use super::{AuthError, AuthFlow, IdentityProvider, OidcClaims, Session, SessionId};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over OIDC identity providers.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Generate the authorization URL for the user redirect.
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url>;

    /// Exchange an authorization code for verified claims.
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<OidcClaims>;

    /// Which provider this client represents.
    fn provider(&self) -> IdentityProvider;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Retrieve a session by id.
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;

    /// Delete a specific session (sign-out).
    async fn delete_session(&self, id: &SessionId) -> Result<()>;

    /// Delete all sessions for a user.
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<()>;

    /// List sessions for a user (debug surface).
    async fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>>;

    /// Store PKCE/CSRF state for a login flow.
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlow) -> Result<()>;

    /// Retrieve and delete the flow state for a callback; atomic so a
    /// state parameter cannot be replayed.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlow>>;
}
