//! SQLite session storage.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use vibes_core::auth::{
    AuthError, AuthFlow, IdentityProvider, Result, Session, SessionId, SessionRepository,
    AUTH_FLOW_TTL_MINUTES,
};

/// SQLite-backed session storage.
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the session tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_flows (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                provider TEXT NOT NULL,
                created_at TEXT NOT NULL,
                callback_url TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}

fn parse_provider(provider: &str) -> Result<IdentityProvider> {
    provider
        .parse()
        .map_err(|_| AuthError::Storage(format!("unknown provider: {provider}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AuthError::Storage(e.to_string()))
}

fn parse_user_id(value: &str) -> Result<Uuid> {
    value
        .parse()
        .map_err(|_| AuthError::Storage(format!("invalid user id: {value}")))
}

type SessionRow = (String, String, String, String, String);

fn session_from_row(row: SessionRow) -> Result<Session> {
    let (id, user_id, provider, created_at, expires_at) = row;
    Ok(Session {
        id: SessionId::new(id),
        user_id: parse_user_id(&user_id)?,
        provider: parse_provider(&provider)?,
        created_at: parse_timestamp(&created_at)?,
        expires_at: parse_timestamp(&expires_at)?,
    })
}

#[async_trait]
impl SessionRepository for SqliteSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        // Prune expired rows while we are here; rfc3339 strings in UTC
        // compare lexicographically.
        sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "INSERT INTO sessions (id, user_id, provider, created_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.as_str())
        .bind(session.user_id.to_string())
        .bind(session.provider.as_str())
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, provider, created_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(session_from_row).transpose()
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, provider, created_at, expires_at FROM sessions WHERE user_id = ? ORDER BY created_at",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(session_from_row).collect()
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlow) -> Result<()> {
        // Abandoned logins never come back for their row; drop stale ones.
        let cutoff = Utc::now() - Duration::minutes(AUTH_FLOW_TTL_MINUTES);
        sqlx::query("DELETE FROM auth_flows WHERE created_at <= ?")
            .bind(cutoff.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            "INSERT OR REPLACE INTO auth_flows (state, pkce_verifier, provider, created_at, callback_url) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(state)
        .bind(&flow.pkce_verifier)
        .bind(flow.provider.as_str())
        .bind(flow.created_at.to_rfc3339())
        .bind(&flow.callback_url)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlow>> {
        // SELECT and DELETE in one transaction so a state cannot be replayed.
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let row = sqlx::query_as::<_, (String, String, String, Option<String>)>(
            "SELECT pkce_verifier, provider, created_at, callback_url FROM auth_flows WHERE state = ?",
        )
        .bind(state)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_err)?;

        if row.is_some() {
            sqlx::query("DELETE FROM auth_flows WHERE state = ?")
                .bind(state)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;

        match row {
            Some((pkce_verifier, provider, created_at, callback_url)) => Ok(Some(AuthFlow {
                pkce_verifier,
                provider: parse_provider(&provider)?,
                created_at: parse_timestamp(&created_at)?,
                callback_url,
            })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use vibes_core::auth::generate_session_id;

    async fn store() -> SqliteSessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteSessionStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: generate_session_id(),
            user_id: Uuid::new_v4(),
            provider: IdentityProvider::Google,
            created_at: expires_at - Duration::days(7),
            expires_at,
        }
    }

    #[tokio::test]
    async fn session_roundtrip() {
        let store = store().await;
        let session = session_expiring_at(Utc::now() + Duration::days(7));

        store.create_session(&session).await.unwrap();
        let found = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, session.user_id);

        store.delete_session(&session.id).await.unwrap();
        assert!(store.get_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn creating_a_session_prunes_expired_rows() {
        let store = store().await;

        let expired = session_expiring_at(Utc::now() - Duration::days(1));
        store.create_session(&expired).await.unwrap();

        let live = session_expiring_at(Utc::now() + Duration::days(7));
        store.create_session(&live).await.unwrap();

        assert!(store.get_session(&expired.id).await.unwrap().is_none());
        assert!(store.get_session(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn storing_a_flow_prunes_stale_rows() {
        let store = store().await;

        let stale = AuthFlow {
            pkce_verifier: "old".to_string(),
            provider: IdentityProvider::Google,
            created_at: Utc::now() - Duration::minutes(2 * AUTH_FLOW_TTL_MINUTES),
            callback_url: None,
        };
        store.store_auth_flow("stale", &stale).await.unwrap();

        let fresh = AuthFlow {
            pkce_verifier: "new".to_string(),
            provider: IdentityProvider::AzureAd,
            created_at: Utc::now(),
            callback_url: Some("/dashboard".to_string()),
        };
        store.store_auth_flow("fresh", &fresh).await.unwrap();

        assert!(store.take_auth_flow("stale").await.unwrap().is_none());

        let taken = store.take_auth_flow("fresh").await.unwrap().unwrap();
        assert_eq!(taken.callback_url.as_deref(), Some("/dashboard"));
        // Consumed on take.
        assert!(store.take_auth_flow("fresh").await.unwrap().is_none());
    }
}
