//! Session resolution and enrichment.
//!
//! Every session read goes through `resolve_session` (cookie to stored
//! session) and `enrich_session` (stored session to per-request view). The
//! enriched view copies the user fields from the user record and attaches
//! the provider label from the user's linked accounts; it is rebuilt on
//! every read and never persisted.

use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use vibes_core::auth::{
    derive_provider, is_session_expired, Session, SessionId, SessionUser,
};

use crate::error::AuthError;
use crate::state::AuthState;

/// Enriched, request-scoped view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// The enriched user, absent when the backing user record is missing.
    pub user: Option<SessionUser>,
    pub expires: DateTime<Utc>,
}

/// Resolve the request's session from the cookie header.
///
/// Missing cookie, unknown session, expired session and storage faults all
/// collapse to `None`: a failed session read is "no session" at this layer.
pub async fn resolve_session(state: &AuthState, headers: &HeaderMap) -> Option<Session> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(&state.config.cookie_name)?;
    let session_id = SessionId::new(cookie.value().to_string());

    let session = match state.sessions.get_session(&session_id).await {
        Ok(Some(session)) => session,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(error = %e, "session lookup failed");
            return None;
        }
    };

    if is_session_expired(&session, Utc::now()) {
        return None;
    }

    Some(session)
}

/// Enrich a stored session into its per-request view.
///
/// Performs exactly one read against the account store. When the backing
/// user record does not exist the session is returned without enrichment
/// (no user, no error). A storage fault propagates to the caller, where it
/// is surfaced as a failed session read.
pub async fn enrich_session(state: &AuthState, session: &Session) -> Result<SessionView, AuthError> {
    let user = state
        .users
        .get_user(session.user_id)
        .await
        .map_err(|e| vibes_core::auth::AuthError::Storage(e.to_string()))?;

    let Some(user) = user else {
        return Ok(SessionView {
            user: None,
            expires: session.expires_at,
        });
    };

    let accounts = state
        .accounts
        .accounts_for_user(user.id)
        .await
        .map_err(|e| vibes_core::auth::AuthError::Storage(e.to_string()))?;

    Ok(SessionView {
        user: Some(SessionUser {
            id: user.id,
            name: user.name,
            email: Some(user.email),
            image: user.image,
            provider: derive_provider(&accounts).to_string(),
        }),
        expires: session.expires_at,
    })
}
