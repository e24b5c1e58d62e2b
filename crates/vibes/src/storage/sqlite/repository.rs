//! SQLite repository implementation.
//!
//! Implements the repository traits from `vibes_core::storage` on top of a
//! shared `SqlitePool`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use vibes_core::model::{
    Account, Organization, OrganizationMember, OrganizationRole, Project, Task, User,
};
use vibes_core::storage::{
    AccountRepository, OrganizationRepository, ProjectRepository, Result, StorageError,
    TaskRepository, UserRepository,
};

use super::schema;

/// SQLite-based repository implementation.
///
/// Cheap to clone; every clone shares the underlying pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the schema tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(schema::CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict(db.message().to_string())
        }
        _ => StorageError::Database(e.to_string()),
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    value
        .parse()
        .map_err(|_| StorageError::Corrupt(format!("invalid uuid: {value}")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(e.to_string()))
}

type UserRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
);

fn user_from_row(row: UserRow) -> Result<User> {
    let (id, email, name, image, role, created_at, updated_at) = row;
    Ok(User {
        id: parse_uuid(&id)?,
        email,
        name,
        image,
        role: role
            .parse()
            .map_err(|e: String| StorageError::Corrupt(e))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

type AccountRow = (String, String, String, String, String);

fn account_from_row(row: AccountRow) -> Result<Account> {
    let (id, user_id, provider, provider_account_id, linked_at) = row;
    Ok(Account {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        provider,
        provider_account_id,
        linked_at: parse_timestamp(&linked_at)?,
    })
}

type OrganizationRow = (String, String, String, Option<String>, String, String);

fn organization_from_row(row: OrganizationRow) -> Result<Organization> {
    let (id, name, slug, description, plan_type, created_at) = row;
    Ok(Organization {
        id: parse_uuid(&id)?,
        name,
        slug,
        description,
        plan_type: plan_type
            .parse()
            .map_err(|e: String| StorageError::Corrupt(e))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

type ProjectRow = (String, String, Option<String>, String, i64, String);

fn project_from_row(row: ProjectRow) -> Result<Project> {
    let (id, name, description, organization_id, is_public, created_at) = row;
    Ok(Project {
        id: parse_uuid(&id)?,
        name,
        description,
        organization_id: parse_uuid(&organization_id)?,
        is_public: is_public != 0,
        created_at: parse_timestamp(&created_at)?,
    })
}

type TaskRow = (
    String,
    String,
    Option<String>,
    String,
    i64,
    Option<String>,
    String,
);

fn task_from_row(row: TaskRow) -> Result<Task> {
    let (id, title, description, project_id, completed, due_date, created_at) = row;
    Ok(Task {
        id: parse_uuid(&id)?,
        title,
        description,
        project_id: parse_uuid(&project_id)?,
        completed: completed != 0,
        due_date: due_date.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(schema::SELECT_USER_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(user_from_row).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(schema::SELECT_USER_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(user_from_row).transpose()
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        sqlx::query(schema::INSERT_USER)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.image)
            .bind(user.role.to_string())
            .bind(user.created_at.to_rfc3339())
            .bind(user.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(schema::UPDATE_USER)
            .bind(&user.name)
            .bind(&user.image)
            .bind(user.role.to_string())
            .bind(user.updated_at.to_rfc3339())
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn get_account_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(schema::SELECT_ACCOUNT_BY_PROVIDER)
            .bind(provider)
            .bind(provider_account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(account_from_row).transpose()
    }

    async fn accounts_for_user(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(schema::SELECT_ACCOUNTS_FOR_USER)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter().map(account_from_row).collect()
    }

    async fn create_account(&self, account: &Account) -> Result<()> {
        sqlx::query(schema::INSERT_ACCOUNT)
            .bind(account.id.to_string())
            .bind(account.user_id.to_string())
            .bind(&account.provider)
            .bind(&account.provider_account_id)
            .bind(account.linked_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for SqliteRepository {
    async fn get_organization_by_slug(&self, slug: &str) -> Result<Option<Organization>> {
        let row = sqlx::query_as::<_, OrganizationRow>(schema::SELECT_ORGANIZATION_BY_SLUG)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(organization_from_row).transpose()
    }

    async fn create_organization(&self, organization: &Organization) -> Result<()> {
        sqlx::query(schema::INSERT_ORGANIZATION)
            .bind(organization.id.to_string())
            .bind(&organization.name)
            .bind(&organization.slug)
            .bind(&organization.description)
            .bind(organization.plan_type.to_string())
            .bind(organization.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn upsert_member(&self, member: &OrganizationMember) -> Result<()> {
        sqlx::query(schema::UPSERT_MEMBER)
            .bind(member.user_id.to_string())
            .bind(member.organization_id.to_string())
            .bind(member.role.to_string())
            .bind(member.joined_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn organizations_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<(Organization, OrganizationRole)>> {
        type Row = (String, String, String, Option<String>, String, String, String);

        let rows = sqlx::query_as::<_, Row>(schema::SELECT_ORGANIZATIONS_FOR_USER)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter()
            .map(|(id, name, slug, description, plan_type, created_at, role)| {
                let organization =
                    organization_from_row((id, name, slug, description, plan_type, created_at))?;
                let role = role
                    .parse()
                    .map_err(|e: String| StorageError::Corrupt(e))?;
                Ok((organization, role))
            })
            .collect()
    }
}

#[async_trait]
impl ProjectRepository for SqliteRepository {
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(schema::SELECT_PROJECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(project_from_row).transpose()
    }

    async fn create_project(&self, project: &Project) -> Result<()> {
        sqlx::query(schema::INSERT_PROJECT)
            .bind(project.id.to_string())
            .bind(&project.name)
            .bind(&project.description)
            .bind(project.organization_id.to_string())
            .bind(project.is_public as i64)
            .bind(project.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn projects_for_organization(&self, organization_id: Uuid) -> Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(schema::SELECT_PROJECTS_FOR_ORGANIZATION)
            .bind(organization_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter().map(project_from_row).collect()
    }
}

#[async_trait]
impl TaskRepository for SqliteRepository {
    async fn create_task(&self, task: &Task) -> Result<()> {
        sqlx::query(schema::INSERT_TASK)
            .bind(task.id.to_string())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.project_id.to_string())
            .bind(task.completed as i64)
            .bind(task.due_date.map(|d| d.to_rfc3339()))
            .bind(task.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(())
    }

    async fn tasks_for_project(&self, project_id: Uuid) -> Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(schema::SELECT_TASKS_FOR_PROJECT)
            .bind(project_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;

        rows.into_iter().map(task_from_row).collect()
    }
}
