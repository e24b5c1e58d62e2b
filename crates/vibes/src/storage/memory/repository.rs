//! In-memory repository implementation.
//!
//! Backs the demo mode and tests; data is lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use vibes_core::model::{
    Account, Organization, OrganizationMember, OrganizationRole, Project, Task, User,
};
use vibes_core::storage::{
    AccountRepository, OrganizationRepository, ProjectRepository, Result, StorageError,
    TaskRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    accounts: Vec<Account>,
    organizations: HashMap<Uuid, Organization>,
    members: Vec<OrganizationMember>,
    projects: HashMap<Uuid, Project>,
    tasks: Vec<Task>,
}

/// In-memory repository over a single read-write lock.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StorageError::Conflict(format!(
                "users.email: {}",
                user.email
            )));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn get_account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn accounts_for_user(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let tables = self.tables.read().await;
        let mut accounts: Vec<Account> = tables
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| (a.linked_at, a.id));
        Ok(accounts)
    }

    async fn create_account(&self, account: &Account) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.accounts.iter().any(|a| {
            a.provider == account.provider && a.provider_account_id == account.provider_account_id
        }) {
            return Err(StorageError::Conflict(format!(
                "accounts: {}/{}",
                account.provider, account.provider_account_id
            )));
        }
        tables.accounts.push(account.clone());
        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for MemoryRepository {
    async fn get_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        Ok(self
            .tables
            .read()
            .await
            .organizations
            .values()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn create_organization(&self, organization: &Organization) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .organizations
            .values()
            .any(|o| o.slug == organization.slug)
        {
            return Err(StorageError::Conflict(format!(
                "organizations.slug: {}",
                organization.slug
            )));
        }
        tables
            .organizations
            .insert(organization.id, organization.clone());
        Ok(())
    }

    async fn upsert_member(&self, member: &OrganizationMember) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.members.iter_mut().find(|m| {
            m.user_id == member.user_id && m.organization_id == member.organization_id
        }) {
            Some(existing) => existing.role = member.role,
            None => tables.members.push(member.clone()),
        }
        Ok(())
    }

    async fn organizations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Organization, OrganizationRole)>> {
        let tables = self.tables.read().await;
        let mut result: Vec<(Organization, OrganizationRole)> = tables
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                tables
                    .organizations
                    .get(&m.organization_id)
                    .map(|o| (o.clone(), m.role))
            })
            .collect();
        result.sort_by_key(|(o, _)| o.created_at);
        Ok(result)
    }
}

#[async_trait]
impl ProjectRepository for MemoryRepository {
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        self.tables
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn projects_for_organization(&self, organization_id: Uuid) -> Result<Vec<Project>> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables
            .projects
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        Ok(projects)
    }
}

#[async_trait]
impl TaskRepository for MemoryRepository {
    async fn create_task(&self, task: &Task) -> Result<()> {
        self.tables.write().await.tasks.push(task.clone());
        Ok(())
    }

    async fn tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let repo = MemoryRepository::new();
        repo.create_user(&User::new("dup@example.com")).await.unwrap();

        let err = repo
            .create_user(&User::new("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_accounts_sorted_by_linked_at() {
        let repo = MemoryRepository::new();
        let user = User::new("multi@example.com");
        repo.create_user(&user).await.unwrap();

        let mut older = Account::new(user.id, "google", "sub-1");
        older.linked_at = chrono::Utc::now() - chrono::Duration::hours(1);
        let newer = Account::new(user.id, "azure-ad", "sub-2");

        repo.create_account(&newer).await.unwrap();
        repo.create_account(&older).await.unwrap();

        let accounts = repo.accounts_for_user(user.id).await.unwrap();
        assert_eq!(accounts[0].provider, "google");
    }

    #[tokio::test]
    async fn test_membership_upsert() {
        let repo = MemoryRepository::new();
        let user = User::new("m@example.com");
        let org = Organization::new("Acme", "acme");
        repo.create_user(&user).await.unwrap();
        repo.create_organization(&org).await.unwrap();

        repo.upsert_member(&OrganizationMember::new(
            user.id,
            org.id,
            OrganizationRole::Member,
        ))
        .await
        .unwrap();
        repo.upsert_member(&OrganizationMember::owner(user.id, org.id))
            .await
            .unwrap();

        let orgs = repo.organizations_for_user(user.id).await.unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].1, OrganizationRole::Owner);
    }
}
