//! Unauthenticated debug endpoints returning JSON snapshots.
//!
//! Development diagnostics only; none of these routes mutate anything.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use vibes_auth::{enrich_session, resolve_session};
use vibes_core::auth::IdentityProvider;

use crate::error::AppError;
use crate::state::AppState;

/// Environment variables surfaced as presence flags.
const ENV_FLAGS: &[&str] = &[
    "AUTH_BASE_URL",
    "AZURE_AD_CLIENT_ID",
    "AZURE_AD_CLIENT_SECRET",
    "AZURE_AD_TENANT_ID",
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "SESSION_TTL_DAYS",
    "SQLITE_PATH",
    "STORAGE_BACKEND",
];

/// GET /api/debug/env - presence flags for the configuration variables.
///
/// Values are never echoed, only whether each variable is set.
pub async fn env() -> Json<serde_json::Value> {
    let flags: serde_json::Map<String, serde_json::Value> = ENV_FLAGS
        .iter()
        .map(|name| ((*name).to_string(), std::env::var(name).is_ok().into()))
        .collect();

    Json(serde_json::Value::Object(flags))
}

/// GET /api/debug/session - the enriched session plus request cookie names.
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let cookie_names: Vec<String> = CookieJar::from_headers(&headers)
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let session = match resolve_session(&state.auth, &headers).await {
        Some(session) => {
            let view = enrich_session(&state.auth, &session).await?;
            Some(serde_json::to_value(view)?)
        }
        None => None,
    };

    Ok(Json(json!({
        "session": session,
        "cookies": cookie_names,
    })))
}

/// GET /api/debug/database - `SELECT 1` connectivity probe.
pub async fn database(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.db.ping().await?;

    Ok(Json(json!({
        "status": "connected",
        "backend": state.db.backend_name(),
    })))
}

#[derive(Deserialize, Default)]
pub struct UserQuery {
    email: Option<String>,
}

/// GET /api/debug/user?email= - user row with accounts, sessions and
/// organization memberships. 400 without the parameter.
pub async fn user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Response, AppError> {
    let Some(email) = query.email else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing required query parameter: email" })),
        )
            .into_response());
    };

    let Some(user) = state.users.get_user_by_email(&email).await? else {
        return Ok(Json(json!({ "user": null })).into_response());
    };

    let accounts = state.accounts.accounts_for_user(user.id).await?;
    let sessions = state.auth.sessions.sessions_for_user(user.id).await?;
    let memberships: Vec<serde_json::Value> = state
        .organizations
        .organizations_for_user(user.id)
        .await?
        .into_iter()
        .map(|(organization, role)| {
            json!({
                "organization": organization,
                "role": role,
            })
        })
        .collect();

    Ok(Json(json!({
        "user": user,
        "accounts": accounts,
        "sessions": sessions,
        "memberships": memberships,
    }))
    .into_response())
}

/// GET /api/debug/auth - configured providers, pages and environment flags.
pub async fn auth(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "providers": {
            "azure-ad": state.auth.provider_enabled(IdentityProvider::AzureAd),
            "google": state.auth.provider_enabled(IdentityProvider::Google),
        },
        "pages": {
            "signIn": "/auth/signin",
        },
        "environment": {
            "AZURE_AD_CLIENT_ID": std::env::var("AZURE_AD_CLIENT_ID").is_ok(),
            "GOOGLE_CLIENT_ID": std::env::var("GOOGLE_CLIENT_ID").is_ok(),
            "AUTH_BASE_URL": std::env::var("AUTH_BASE_URL").is_ok(),
        },
    }))
}
