use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    Account, Organization, OrganizationMember, OrganizationRole, Project, Task, User,
};

use super::StorageError;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Repository for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their id.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;

    /// Gets a user by their unique email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates a new user. Fails with `Conflict` on a duplicate email.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Updates name, image and role of an existing user.
    async fn update_user(&self, user: &User) -> Result<()>;
}

/// Repository for linked provider accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Gets the account matching a provider and its subject identifier.
    async fn get_account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>>;

    /// Lists a user's accounts ordered by `linked_at`, then id.
    ///
    /// The ordering is load-bearing: session enrichment picks the first
    /// entry, so it must be stable across reads.
    async fn accounts_for_user(&self, user_id: Uuid) -> Result<Vec<Account>>;

    /// Creates a new account link.
    async fn create_account(&self, account: &Account) -> Result<()>;
}

/// Repository for organizations and their memberships.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Gets an organization by its unique slug.
    async fn get_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>>;

    /// Creates a new organization.
    async fn create_organization(&self, organization: &Organization) -> Result<()>;

    /// Adds a member; replaces the role if the membership already exists.
    async fn upsert_member(&self, member: &OrganizationMember) -> Result<()>;

    /// Lists the organizations a user belongs to, with their role in each.
    async fn organizations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Organization, OrganizationRole)>>;
}

/// Repository for projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Gets a project by id.
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>>;

    /// Creates a new project.
    async fn create_project(&self, project: &Project) -> Result<()>;

    /// Lists projects belonging to an organization.
    async fn projects_for_organization(&self, organization_id: Uuid) -> Result<Vec<Project>>;
}

/// Repository for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Creates a new task.
    async fn create_task(&self, task: &Task) -> Result<()>;

    /// Lists a project's tasks, newest first.
    async fn tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>>;
}
