//! Route-guard middleware.
//!
//! Applies the pure policy from `vibes_core::auth::guard` on every inbound
//! request: exempt paths and public paths pass through untouched; protected
//! paths require a valid session and are otherwise redirected to the
//! sign-in page with the original path in `callbackUrl`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use vibes_core::auth::guard::{classify_path, is_exempt_path, signin_redirect, RouteClass};

use crate::session::resolve_session;
use crate::state::AuthState;

/// Guard every request by path classification.
///
/// Register with `axum::middleware::from_fn_with_state` above the routes it
/// protects. The deny decision is made here; no downstream handler should
/// rely on it alone for per-resource authorization.
pub async fn route_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_exempt_path(&path) {
        return next.run(request).await;
    }

    match classify_path(&path) {
        RouteClass::Public => next.run(request).await,
        RouteClass::Protected => {
            if resolve_session(&state, request.headers()).await.is_some() {
                next.run(request).await
            } else {
                tracing::debug!(path = %path, "unauthenticated request to protected path");
                Redirect::to(&signin_redirect(&path)).into_response()
            }
        }
    }
}
