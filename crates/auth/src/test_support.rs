//! Fake repositories shared by the crate's unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;
use vibes_core::model::{Account, User};
use vibes_core::storage::{AccountRepository, Result as StorageResult, UserRepository};

use crate::config::AuthConfig;
use crate::sessions::MemorySessionStore;
use crate::state::AuthState;

#[derive(Default)]
pub(crate) struct FakeUsers(pub RwLock<Vec<User>>);

#[async_trait]
impl UserRepository for FakeUsers {
    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.0.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        Ok(self.0.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &User) -> StorageResult<()> {
        self.0.write().await.push(user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> StorageResult<()> {
        let mut users = self.0.write().await;
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAccounts(pub RwLock<Vec<Account>>);

#[async_trait]
impl AccountRepository for FakeAccounts {
    async fn get_account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> StorageResult<Option<Account>> {
        Ok(self
            .0
            .read()
            .await
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn accounts_for_user(&self, user_id: Uuid) -> StorageResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .0
            .read()
            .await
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.linked_at, a.id));
        Ok(accounts)
    }

    async fn create_account(&self, account: &Account) -> StorageResult<()> {
        self.0.write().await.push(account.clone());
        Ok(())
    }
}

/// A provider-less `AuthState` over fake repositories.
pub(crate) fn test_state(users: FakeUsers, accounts: FakeAccounts) -> AuthState {
    AuthState::without_providers(
        Arc::new(MemorySessionStore::new()),
        Arc::new(users),
        Arc::new(accounts),
        AuthConfig::disabled(),
    )
}
