use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use vibes_core::auth::SignInError;

/// Auth errors for the vibes_auth crate.
///
/// Wraps the core `AuthError` and adds variants for I/O that can't live in
/// the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state validation, token claims).
    #[error(transparent)]
    Core(#[from] vibes_core::auth::AuthError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured.
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),
}

impl AuthError {
    /// Map this failure to the sign-in error code carried back to the
    /// sign-in page after a failed OAuth flow.
    pub fn signin_code(&self) -> SignInError {
        use vibes_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidState => SignInError::Callback,
                CoreError::CodeExchange(_)
                | CoreError::InvalidToken(_)
                | CoreError::MissingClaim(_) => SignInError::OAuthCallback,
                CoreError::AccountNotLinked => SignInError::OAuthAccountNotLinked,
                CoreError::Storage(_) => SignInError::OAuthCreateAccount,
                CoreError::Provider(_) => SignInError::OAuthSignin,
                CoreError::SessionNotFound | CoreError::SessionExpired => {
                    SignInError::SessionRequired
                }
            },
            AuthError::Config(_) => SignInError::Default,
            AuthError::ProviderNotConfigured(_) => SignInError::OAuthSignin,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use vibes_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidState => (StatusCode::BAD_REQUEST, self.to_string()),
                CoreError::SessionNotFound
                | CoreError::SessionExpired
                | CoreError::InvalidToken(_)
                | CoreError::MissingClaim(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
                CoreError::AccountNotLinked => (StatusCode::CONFLICT, self.to_string()),
                CoreError::CodeExchange(_) | CoreError::Storage(_) | CoreError::Provider(_) => {
                    tracing::error!("auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Config(_) => {
                tracing::error!("config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::ProviderNotConfigured(provider) => (
                StatusCode::NOT_FOUND,
                format!("Authentication provider '{provider}' is not configured"),
            ),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibes_core::auth::AuthError as CoreError;

    #[test]
    fn callback_failures_map_to_signin_codes() {
        assert_eq!(
            AuthError::Core(CoreError::InvalidState).signin_code(),
            SignInError::Callback
        );
        assert_eq!(
            AuthError::Core(CoreError::CodeExchange("boom".into())).signin_code(),
            SignInError::OAuthCallback
        );
        assert_eq!(
            AuthError::Core(CoreError::AccountNotLinked).signin_code(),
            SignInError::OAuthAccountNotLinked
        );
        assert_eq!(
            AuthError::Core(CoreError::Storage("locked".into())).signin_code(),
            SignInError::OAuthCreateAccount
        );
    }
}
