//! Application state with repository-based storage.
//!
//! The shared state passed to all request handlers. Repositories are
//! trait objects constructed once at startup; the backend is selected at
//! runtime from configuration.

use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use vibes_auth::{AuthConfig, AuthState, MemorySessionStore, SqliteSessionStore};
use vibes_core::storage::{
    AccountRepository, OrganizationRepository, ProjectRepository, TaskRepository, UserRepository,
};

use crate::config::{Config, StorageBackend};
use crate::storage::{MemoryRepository, SqliteRepository};

/// Connectivity handle for the active database backend.
#[derive(Clone)]
pub enum DatabaseHandle {
    Sqlite(SqlitePool),
    Memory,
}

impl DatabaseHandle {
    /// Runs a `SELECT 1` probe against the backend.
    pub async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Sqlite(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .context("database ping failed")?;
                Ok(())
            }
            Self::Memory => Ok(()),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// Shared application state.
///
/// Cloned for each request handler; everything inside is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub db: DatabaseHandle,
    pub auth: AuthState,
}

impl AppState {
    /// Creates the state for the configured backend, running migrations
    /// and OIDC provider discovery.
    pub async fn new(config: &Config, auth_config: AuthConfig) -> anyhow::Result<Self> {
        match config.storage_backend {
            StorageBackend::Sqlite => Self::sqlite(&config.sqlite_path, auth_config).await,
            StorageBackend::Memory => Self::memory(auth_config).await,
        }
    }

    async fn sqlite(path: &str, auth_config: AuthConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open sqlite database at {path}"))?;

        let repo = SqliteRepository::new(pool.clone());
        repo.migrate().await.context("schema migration failed")?;

        let sessions = SqliteSessionStore::new(pool.clone());
        sessions
            .migrate()
            .await
            .context("session schema migration failed")?;

        let repo = Arc::new(repo);
        let auth = AuthState::new(
            Arc::new(sessions),
            repo.clone(),
            repo.clone(),
            auth_config,
        )
        .await
        .context("provider discovery failed")?;

        Ok(Self {
            users: repo.clone(),
            accounts: repo.clone(),
            organizations: repo.clone(),
            projects: repo.clone(),
            tasks: repo,
            db: DatabaseHandle::Sqlite(pool),
            auth,
        })
    }

    async fn memory(auth_config: AuthConfig) -> anyhow::Result<Self> {
        let repo = Arc::new(MemoryRepository::new());
        let auth = AuthState::new(
            Arc::new(MemorySessionStore::new()),
            repo.clone(),
            repo.clone(),
            auth_config,
        )
        .await
        .context("provider discovery failed")?;

        Ok(Self {
            users: repo.clone(),
            accounts: repo.clone(),
            organizations: repo.clone(),
            projects: repo.clone(),
            tasks: repo,
            db: DatabaseHandle::Memory,
            auth,
        })
    }
}

/// Lets the auth extractors and routes run against the app state.
impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
