//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use vibes_core::model::User;

use crate::session::resolve_session;
use crate::AuthState;

/// Extractor for the authenticated user. Rejects with 401 when the request
/// carries no valid session.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let session = resolve_session(&auth_state, &parts.headers)
            .await
            .ok_or((StatusCode::UNAUTHORIZED, "No valid session"))?;

        let user = auth_state
            .users
            .get_user(session.user_id)
            .await
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "User lookup failed"))?
            .ok_or((StatusCode::UNAUTHORIZED, "User not found"))?;

        Ok(CurrentUser(user))
    }
}

/// Extractor for the optionally authenticated user. Never rejects.
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let Some(session) = resolve_session(&auth_state, &parts.headers).await else {
            return Ok(OptionalUser(None));
        };

        let user = match auth_state.users.get_user(session.user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "user lookup failed");
                None
            }
        };

        Ok(OptionalUser(user))
    }
}

/// Extractor for the raw session, for handlers that enrich it themselves.
/// Never rejects.
pub struct OptionalSession(pub Option<vibes_core::auth::Session>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        Ok(OptionalSession(
            resolve_session(&auth_state, &parts.headers).await,
        ))
    }
}
