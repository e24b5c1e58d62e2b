//! In-memory session storage for tests and demo mode.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vibes_core::auth::{
    is_auth_flow_expired, AuthFlow, Result, Session, SessionId, SessionRepository,
};

/// In-memory session store. Nothing is persisted; dropping the store loses
/// all sessions and pending auth flows.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    auth_flows: Arc<RwLock<HashMap<String, AuthFlow>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.id.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id.as_str()).cloned())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id.as_str());
        Ok(())
    }

    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.created_at);
        Ok(found)
    }

    async fn store_auth_flow(&self, state: &str, flow: &AuthFlow) -> Result<()> {
        let now = Utc::now();
        let mut flows = self.auth_flows.write().await;
        flows.retain(|_, f| !is_auth_flow_expired(f, now));
        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlow>> {
        let mut flows = self.auth_flows.write().await;
        Ok(flows.remove(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vibes_core::auth::{generate_session_id, IdentityProvider};

    fn test_session(user_id: Uuid) -> Session {
        let now = Utc::now();
        Session {
            id: generate_session_id(),
            user_id,
            provider: IdentityProvider::AzureAd,
            created_at: now,
            expires_at: now + Duration::days(7),
        }
    }

    #[tokio::test]
    async fn create_get_delete_roundtrip() {
        let store = MemorySessionStore::new();
        let session = test_session(Uuid::new_v4());

        store.create_session(&session).await.unwrap();

        let found = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, session.user_id);
        assert_eq!(found.provider, IdentityProvider::AzureAd);

        store.delete_session(&session.id).await.unwrap();
        assert!(store.get_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_user_sessions_only_hits_that_user() {
        let store = MemorySessionStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let a1 = test_session(alice);
        let a2 = test_session(alice);
        let b1 = test_session(bob);
        for s in [&a1, &a2, &b1] {
            store.create_session(s).await.unwrap();
        }

        store.delete_user_sessions(alice).await.unwrap();

        assert!(store.get_session(&a1.id).await.unwrap().is_none());
        assert!(store.get_session(&a2.id).await.unwrap().is_none());
        assert!(store.get_session(&b1.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn storing_a_flow_prunes_stale_ones() {
        let store = MemorySessionStore::new();
        let stale = AuthFlow {
            pkce_verifier: "old".to_string(),
            provider: IdentityProvider::Google,
            created_at: Utc::now() - Duration::minutes(30),
            callback_url: None,
        };
        let fresh = AuthFlow {
            pkce_verifier: "new".to_string(),
            provider: IdentityProvider::AzureAd,
            created_at: Utc::now(),
            callback_url: None,
        };

        store.store_auth_flow("stale", &stale).await.unwrap();
        store.store_auth_flow("fresh", &fresh).await.unwrap();

        assert!(store.take_auth_flow("stale").await.unwrap().is_none());
        assert!(store.take_auth_flow("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn creating_a_session_prunes_expired_ones() {
        let store = MemorySessionStore::new();
        let now = Utc::now();

        let mut expired = test_session(Uuid::new_v4());
        expired.expires_at = now - Duration::days(1);
        store.create_session(&expired).await.unwrap();

        let live = test_session(Uuid::new_v4());
        store.create_session(&live).await.unwrap();

        assert!(store.get_session(&expired.id).await.unwrap().is_none());
        assert!(store.get_session(&live.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn auth_flow_is_consumed_on_take() {
        let store = MemorySessionStore::new();
        let flow = AuthFlow {
            pkce_verifier: "verifier".to_string(),
            provider: IdentityProvider::Google,
            created_at: Utc::now(),
            callback_url: Some("/dashboard".to_string()),
        };

        store.store_auth_flow("state-1", &flow).await.unwrap();

        let taken = store.take_auth_flow("state-1").await.unwrap().unwrap();
        assert_eq!(taken.callback_url.as_deref(), Some("/dashboard"));

        // A second take must fail: the state parameter is single-use.
        assert!(store.take_auth_flow("state-1").await.unwrap().is_none());
    }
}
