//! HTTP handlers for the auth routes.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use openidconnect::PkceCodeChallenge;
use serde::Deserialize;
use vibes_core::auth::{
    calculate_expiry, generate_session_id, generate_state, is_auth_flow_expired,
    validate_callback_url, AuthFlow, IdentityProvider, OidcClaims, Session,
};
use vibes_core::model::{Account, User};

use crate::error::AuthError;
use crate::extractors::{CurrentUser, OptionalSession};
use crate::session::{enrich_session, SessionView};
use crate::AuthState;

/// Query parameters for the OAuth callback.
#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

/// Query parameters for the login endpoints.
#[derive(Deserialize, Default)]
pub struct LoginQuery {
    /// Relative URL to return to after a successful sign-in.
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// Creates the auth router.
///
/// Routes:
/// - `GET /auth/azure-ad/login` - Initiate the Azure AD OIDC flow
/// - `GET /auth/azure-ad/callback` - Handle the Azure AD callback
/// - `GET /auth/google/login` - Initiate the Google OIDC flow
/// - `GET /auth/google/callback` - Handle the Google callback
/// - `POST /auth/signout` - End the current session
/// - `GET /auth/session` - Enriched session as JSON (`null` when signed out)
/// - `GET /auth/me` - Current authenticated user
pub fn auth_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    AuthState: FromRef<S>,
{
    Router::new()
        .route("/auth/azure-ad/login", get(azure_login))
        .route("/auth/azure-ad/callback", get(azure_callback))
        .route("/auth/google/login", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/signout", post(signout))
        .route("/auth/session", get(session))
        .route("/auth/me", get(me))
}

async fn azure_login(
    State(state): State<AuthState>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, AuthError> {
    initiate_login(&state, IdentityProvider::AzureAd, query.callback_url).await
}

async fn google_login(
    State(state): State<AuthState>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, AuthError> {
    initiate_login(&state, IdentityProvider::Google, query.callback_url).await
}

async fn initiate_login(
    state: &AuthState,
    provider: IdentityProvider,
    callback_url: Option<String>,
) -> Result<Redirect, AuthError> {
    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    // Validate callbackUrl to prevent open redirects.
    let validated_callback = callback_url
        .as_deref()
        .and_then(validate_callback_url)
        .map(String::from);

    let flow = AuthFlow {
        pkce_verifier: pkce_verifier.secret().to_string(),
        provider,
        created_at: Utc::now(),
        callback_url: validated_callback,
    };
    state.sessions.store_auth_flow(&csrf_state, &flow).await?;

    let provider_client = state.get_provider(provider)?;
    let auth_url = provider_client
        .authorization_url(&csrf_state, pkce_challenge.as_str())
        .await?;

    Ok(Redirect::to(auth_url.as_str()))
}

async fn azure_callback(
    State(state): State<AuthState>,
    Query(params): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    handle_callback(&state, &params.code, &params.state, jar).await
}

async fn google_callback(
    State(state): State<AuthState>,
    Query(params): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    handle_callback(&state, &params.code, &params.state, jar).await
}

/// Run the callback flow; on failure redirect to the sign-in page with the
/// classified error code instead of surfacing an error body.
async fn handle_callback(state: &AuthState, code: &str, csrf_state: &str, jar: CookieJar) -> Response {
    match complete_callback(state, code, csrf_state, jar).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "sign-in failed");
            let code = e.signin_code().as_code();
            Redirect::to(&format!("/auth/signin?error={code}")).into_response()
        }
    }
}

async fn complete_callback(
    state: &AuthState,
    code: &str,
    csrf_state: &str,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    // Retrieve and consume the PKCE verifier for this state.
    let flow = state
        .sessions
        .take_auth_flow(csrf_state)
        .await?
        .ok_or(AuthError::Core(vibes_core::auth::AuthError::InvalidState))?;

    // An abandoned flow is as invalid as an unknown state.
    if is_auth_flow_expired(&flow, Utc::now()) {
        return Err(AuthError::Core(vibes_core::auth::AuthError::InvalidState));
    }

    let provider_client = state.get_provider(flow.provider)?;
    let claims = provider_client
        .exchange_code(code, &flow.pkce_verifier)
        .await?;

    let user = find_or_create_user(state, &claims).await?;

    let now = Utc::now();
    let session = Session {
        id: generate_session_id(),
        user_id: user.id,
        provider: claims.provider,
        created_at: now,
        expires_at: calculate_expiry(
            now,
            Duration::seconds(state.config.session_ttl.as_secs() as i64),
        ),
    };
    state.sessions.create_session(&session).await?;

    let cookie = Cookie::build((state.config.cookie_name.clone(), session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            state.config.session_ttl.as_secs() as i64
        ))
        .build();

    let jar = jar.add(cookie);

    let redirect_url = flow.callback_url.unwrap_or_else(|| "/".to_string());
    Ok((jar, Redirect::to(&redirect_url)))
}

/// Map verified claims onto the user and account tables.
///
/// - Known (provider, subject) pair: refresh name/image from the claims.
/// - Unknown pair but the email belongs to an existing user: reject with
///   `AccountNotLinked` rather than silently merging identities.
/// - Otherwise create the user and its account link.
async fn find_or_create_user(state: &AuthState, claims: &OidcClaims) -> Result<User, AuthError> {
    let storage =
        |e: vibes_core::storage::StorageError| vibes_core::auth::AuthError::Storage(e.to_string());

    if let Some(account) = state
        .accounts
        .get_account_by_provider(claims.provider.as_str(), &claims.subject)
        .await
        .map_err(storage)?
    {
        let mut user = state
            .users
            .get_user(account.user_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| {
                vibes_core::auth::AuthError::Storage(format!(
                    "account {} references missing user {}",
                    account.id, account.user_id
                ))
            })?;

        // Subsequent sign-in: refresh the profile fields from the provider.
        if claims.name.is_some() && user.name != claims.name
            || claims.picture.is_some() && user.image != claims.picture
        {
            user.name = claims.name.clone().or(user.name);
            user.image = claims.picture.clone().or(user.image);
            user.updated_at = Utc::now();
            state.users.update_user(&user).await.map_err(storage)?;
        }

        return Ok(user);
    }

    let email = claims
        .email
        .clone()
        .ok_or_else(|| vibes_core::auth::AuthError::MissingClaim("email".to_string()))?;

    if state
        .users
        .get_user_by_email(&email)
        .await
        .map_err(storage)?
        .is_some()
    {
        return Err(AuthError::Core(vibes_core::auth::AuthError::AccountNotLinked));
    }

    let mut user = User::new(email);
    user.name = claims.name.clone();
    user.image = claims.picture.clone();
    state.users.create_user(&user).await.map_err(storage)?;

    let account = Account::new(user.id, claims.provider.as_str(), &claims.subject);
    state.accounts.create_account(&account).await.map_err(storage)?;

    Ok(user)
}

async fn signout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    if let Some(cookie) = jar.get(&state.config.cookie_name) {
        let session_id = vibes_core::auth::SessionId::new(cookie.value().to_string());
        state.sessions.delete_session(&session_id).await?;
    }

    let jar = jar.remove(Cookie::from(state.config.cookie_name.clone()));
    Ok((jar, Redirect::to("/auth/signin")))
}

/// The session read surface: enriched session or `null`.
///
/// A storage fault during enrichment is reported as "no session", matching
/// the failure contract of every other session read.
async fn session(
    State(state): State<AuthState>,
    OptionalSession(session): OptionalSession,
) -> Json<Option<SessionView>> {
    let Some(session) = session else {
        return Json(None);
    };

    match enrich_session(&state, &session).await {
        Ok(view) => Json(Some(view)),
        Err(e) => {
            tracing::error!(error = %e, "session enrichment failed");
            Json(None)
        }
    }
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
