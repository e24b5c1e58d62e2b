use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application-level role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// A persistent identity record.
///
/// Name and image come from the identity provider and may be absent;
/// fallbacks ("N/A") are applied at the presentation boundary, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id and the default role.
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: None,
            image: None,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }
}

/// A persisted link between a user and one identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Provider slug, e.g. `"azure-ad"` or `"google"`.
    pub provider: String,
    /// The provider's unique identifier for this user (OIDC subject).
    pub provider_account_id: String,
    /// Explicit ordering key so first-match provider derivation is stable.
    pub linked_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        user_id: Uuid,
        provider: impl Into<String>,
        provider_account_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            provider: provider.into(),
            provider_account_id: provider_account_id.into(),
            linked_at: Utc::now(),
        }
    }
}

/// Subscription plan of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanType {
    Free,
    Pro,
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "FREE"),
            Self::Pro => write!(f, "PRO"),
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(Self::Free),
            "PRO" => Ok(Self::Pro),
            other => Err(format!("unknown plan type: {other}")),
        }
    }
}

/// A tenant organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub plan_type: PlanType,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            plan_type: PlanType::Free,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_plan(mut self, plan: PlanType) -> Self {
        self.plan_type = plan;
        self
    }
}

/// Role of a user within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrganizationRole {
    Owner,
    Member,
}

impl std::fmt::Display for OrganizationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "OWNER"),
            Self::Member => write!(f, "MEMBER"),
        }
    }
}

impl std::str::FromStr for OrganizationRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Self::Owner),
            "MEMBER" => Ok(Self::Member),
            other => Err(format!("unknown organization role: {other}")),
        }
    }
}

/// Membership of a user in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: OrganizationRole,
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMember {
    pub fn new(user_id: Uuid, organization_id: Uuid, role: OrganizationRole) -> Self {
        Self {
            user_id,
            organization_id,
            role,
            joined_at: Utc::now(),
        }
    }

    pub fn owner(user_id: Uuid, organization_id: Uuid) -> Self {
        Self::new(user_id, organization_id, OrganizationRole::Owner)
    }
}

/// A project owned by an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_id: Uuid,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, organization_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            organization_id,
            is_public: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A task within a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>, project_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            project_id,
            completed: false,
            due_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}
