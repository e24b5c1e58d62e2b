//! Server-rendered pages.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use vibes_auth::{enrich_session, resolve_session};
use vibes_core::auth::guard::signin_redirect;
use vibes_core::auth::{
    provider_label, validate_callback_url, IdentityProvider, SessionUser, SignInError,
};

use crate::error::AppError;
use crate::state::AppState;

/// Template wrapper that converts Askama templates into HTML responses.
struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {err}"),
            )
                .into_response(),
        }
    }
}

/// "N/A" fallback for optional profile fields, applied here and nowhere else.
fn display_or_na(value: Option<&str>) -> String {
    value.unwrap_or("N/A").to_string()
}

/// View model for the signed-in panels.
struct PageUser {
    name: String,
    email: String,
    provider: String,
    id: String,
}

impl PageUser {
    fn from_session(user: &SessionUser) -> Self {
        Self {
            name: display_or_na(user.name.as_deref()),
            email: display_or_na(user.email.as_deref()),
            provider: provider_label(&user.provider).to_string(),
            id: user.id.to_string(),
        }
    }
}

/// The enriched user for the current request, or `None` when signed out.
///
/// Enrichment faults are logged and collapse to "no session".
async fn current_session_user(state: &AppState, headers: &HeaderMap) -> Option<SessionUser> {
    let session = resolve_session(&state.auth, headers).await?;
    match enrich_session(&state.auth, &session).await {
        Ok(view) => view.user,
        Err(err) => {
            tracing::error!(error = %err, "session enrichment failed");
            None
        }
    }
}

/// Marketing page template with the auth-status panel.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    user: Option<PageUser>,
}

/// Handler for the marketing page (GET /).
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let user = current_session_user(&state, &headers)
        .await
        .as_ref()
        .map(PageUser::from_session);

    HtmlTemplate(IndexTemplate { user })
}

#[derive(Deserialize, Default)]
pub struct SigninQuery {
    error: Option<String>,
    #[serde(rename = "callbackUrl")]
    callback_url: Option<String>,
}

/// Sign-in page template.
#[derive(Template)]
#[template(path = "signin.html")]
struct SigninTemplate {
    error: Option<String>,
    login_query: String,
    azure_ad_enabled: bool,
    google_enabled: bool,
}

/// Handler for the sign-in page (GET /auth/signin).
///
/// Already-authenticated visitors are sent back to the marketing page. The
/// `error` query parameter is classified into its fixed human-readable
/// message before rendering, and a validated `callbackUrl` is threaded into
/// the provider login links so the flow lands back on the requested page.
pub async fn signin(
    State(state): State<AppState>,
    Query(query): Query<SigninQuery>,
    headers: HeaderMap,
) -> Response {
    if current_session_user(&state, &headers).await.is_some() {
        return Redirect::to("/").into_response();
    }

    let error = query
        .error
        .as_deref()
        .map(|code| SignInError::parse(code).message().to_string());

    let login_query = query
        .callback_url
        .as_deref()
        .and_then(validate_callback_url)
        .map(|url| format!("?callbackUrl={url}"))
        .unwrap_or_default();

    HtmlTemplate(SigninTemplate {
        error,
        login_query,
        azure_ad_enabled: state.auth.provider_enabled(IdentityProvider::AzureAd),
        google_enabled: state.auth.provider_enabled(IdentityProvider::Google),
    })
    .into_response()
}

/// One organization row on the dashboard.
struct OrganizationView {
    name: String,
    role: String,
    plan: String,
    projects: Vec<ProjectView>,
}

/// One project row with its task counts.
struct ProjectView {
    name: String,
    completed: usize,
    total: usize,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    user: PageUser,
    organizations: Vec<OrganizationView>,
}

/// Handler for the dashboard (GET /dashboard).
///
/// The route guard already denies unauthenticated requests; the redirect
/// here covers the enrichment-failed case without panicking.
pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(session_user) = current_session_user(&state, &headers).await else {
        return Ok(Redirect::to(&signin_redirect("/dashboard")).into_response());
    };

    let mut organizations = Vec::new();
    for (organization, role) in state
        .organizations
        .organizations_for_user(session_user.id)
        .await?
    {
        let mut projects = Vec::new();
        for project in state
            .projects
            .projects_for_organization(organization.id)
            .await?
        {
            let tasks = state.tasks.tasks_for_project(project.id).await?;
            projects.push(ProjectView {
                name: project.name,
                completed: tasks.iter().filter(|t| t.completed).count(),
                total: tasks.len(),
            });
        }

        organizations.push(OrganizationView {
            name: organization.name,
            role: role.to_string(),
            plan: organization.plan_type.to_string(),
            projects,
        });
    }

    Ok(HtmlTemplate(DashboardTemplate {
        user: PageUser::from_session(&session_user),
        organizations,
    })
    .into_response())
}
