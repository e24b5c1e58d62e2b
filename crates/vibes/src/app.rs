use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use vibes_auth::{auth_routes, route_guard};

use crate::{
    config::Config,
    handlers::{debug, health, pages},
    state::AppState,
};

/// Create the application router with all routes and middleware.
///
/// The route guard runs on every request; `/auth` and static assets are
/// exempt inside the guard itself.
pub fn create_app(state: AppState, config: &Config) -> Router {
    let debug_routes = Router::new()
        .route("/env", get(debug::env))
        .route("/session", get(debug::session))
        .route("/database", get(debug::database))
        .route("/user", get(debug::user))
        .route("/auth", get(debug::auth));

    Router::new()
        .route("/", get(pages::index))
        .route("/auth/signin", get(pages::signin))
        .route("/dashboard", get(pages::dashboard))
        .route("/livez", get(health::livez))
        .route("/healthz", get(health::healthz))
        .nest("/api/debug", debug_routes)
        .merge(auth_routes())
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            route_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_seconds),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use url::Url;
    use vibes_core::auth::{
        generate_session_id, AuthError, IdentityProvider, OidcClaims, ProviderClient, Session,
    };
    use vibes_core::model::{Account, User};

    /// Provider client that never completes an exchange; enough to make the
    /// sign-in page render its login link.
    struct StubProvider(IdentityProvider);

    #[async_trait::async_trait]
    impl ProviderClient for StubProvider {
        async fn authorization_url(
            &self,
            _state: &str,
            _pkce_challenge: &str,
        ) -> vibes_core::auth::Result<Url> {
            Url::parse("https://provider.example/authorize")
                .map_err(|e| AuthError::Provider(e.to_string()))
        }

        async fn exchange_code(
            &self,
            _code: &str,
            _pkce_verifier: &str,
        ) -> vibes_core::auth::Result<OidcClaims> {
            Err(AuthError::Provider("stub".to_string()))
        }

        fn provider(&self) -> IdentityProvider {
            self.0
        }
    }

    fn state_with_stub_providers() -> AppState {
        let mut state = AppState::default();
        state.auth = state
            .auth
            .clone()
            .with_provider(
                IdentityProvider::AzureAd,
                Arc::new(StubProvider(IdentityProvider::AzureAd)),
            )
            .with_provider(
                IdentityProvider::Google,
                Arc::new(StubProvider(IdentityProvider::Google)),
            );
        state
    }

    fn test_config() -> Config {
        Config {
            storage_backend: crate::config::StorageBackend::Memory,
            sqlite_path: "unused.db".to_string(),
            request_timeout_seconds: 10,
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).unwrap()
    }

    /// Creates a signed-in user with a linked account and a live session,
    /// returning the session cookie value.
    async fn sign_in(state: &AppState, name: &str, provider: &str) -> String {
        let user = User::new(format!("{name}@example.com")).with_name(name);
        state.users.create_user(&user).await.unwrap();
        state
            .accounts
            .create_account(&Account::new(user.id, provider, format!("sub-{name}")))
            .await
            .unwrap();

        let session = Session {
            id: generate_session_id(),
            user_id: user.id,
            provider: provider.parse().unwrap_or(IdentityProvider::Google),
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(7),
        };
        state.auth.sessions.create_session(&session).await.unwrap();

        format!("vibes_session={}", session.id.as_str())
    }

    #[tokio::test]
    async fn test_index_page_signed_out() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("You are not signed in."));
    }

    #[tokio::test]
    async fn test_dashboard_redirects_when_signed_out() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/signin?callbackUrl=/dashboard"
        );
    }

    #[tokio::test]
    async fn test_other_protected_prefixes_redirect_too() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        for path in ["/admin", "/profile/me", "/settings"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(
                response.headers()[header::LOCATION],
                format!("/auth/signin?callbackUrl={path}"),
                "{path}"
            );
        }
    }

    #[tokio::test]
    async fn test_signin_page_classifies_error_codes() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/signin?error=OAuthAccountNotLinked")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Email already exists with a different provider."));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/signin?error=WeirdCode123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains("An error occurred during sign in."));
    }

    #[tokio::test]
    async fn test_signin_page_threads_callback_url_into_login_links() {
        let state = state_with_stub_providers();
        let app = create_app(state, &test_config());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/auth/signin?callbackUrl=/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("/auth/azure-ad/login?callbackUrl=/dashboard"));
        assert!(html.contains("/auth/google/login?callbackUrl=/dashboard"));

        // Values that fail callback validation are dropped, not echoed.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/signin?callbackUrl=//evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let html = body_string(response).await;
        assert!(html.contains("href=\"/auth/google/login\""));
        assert!(!html.contains("evil.example"));
    }

    #[tokio::test]
    async fn test_signin_redirects_authenticated_visitors_home() {
        let state = AppState::default();
        let cookie = sign_in(&state, "visitor", "google").await;
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/signin")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_dashboard_shows_enriched_session() {
        let state = AppState::default();
        let cookie = sign_in(&state, "Alice", "azure-ad").await;
        crate::seed::seed(&state).await.unwrap();
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Alice"));
        assert!(html.contains("Microsoft Azure AD"));
    }

    #[tokio::test]
    async fn test_session_endpoint_is_null_when_signed_out() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "null");
    }

    #[tokio::test]
    async fn test_debug_user_requires_email() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/debug/user")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_debug_user_reports_linked_accounts() {
        let state = AppState::default();
        sign_in(&state, "linked", "google").await;
        let app = create_app(state, &test_config());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/debug/user?email=linked@example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["user"]["email"], "linked@example.com");
        assert_eq!(json["accounts"][0]["provider"], "google");
        assert_eq!(json["sessions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_debug_endpoints_are_guard_exempt_or_public() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        for path in ["/api/debug/env", "/api/debug/database", "/api/debug/auth"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_health_probes() {
        let state = AppState::default();
        let app = create_app(state, &test_config());

        for path in ["/livez", "/healthz"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn test_signout_clears_the_session() {
        let state = AppState::default();
        let cookie = sign_in(&state, "leaver", "google").await;
        let app = create_app(state, &test_config());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/signout")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/auth/signin");

        // The old cookie no longer resolves to a session.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/auth/session")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "null");
    }
}
