//! SQLite schema definitions and SQL query constants.
//!
//! All SQL used by the SQLite repository lives here as pure data, no I/O.
//! Timestamps are stored as RFC 3339 TEXT.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT,
    image TEXT,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Linked provider accounts table
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    provider TEXT NOT NULL,
    provider_account_id TEXT NOT NULL,
    linked_at TEXT NOT NULL,
    UNIQUE (provider, provider_account_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Organizations table
CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    description TEXT,
    plan_type TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Organization memberships table
CREATE TABLE IF NOT EXISTS organization_members (
    user_id TEXT NOT NULL,
    organization_id TEXT NOT NULL,
    role TEXT NOT NULL,
    joined_at TEXT NOT NULL,
    PRIMARY KEY (user_id, organization_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE CASCADE
);

-- Projects table
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    organization_id TEXT NOT NULL,
    is_public INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    FOREIGN KEY (organization_id) REFERENCES organizations(id) ON DELETE CASCADE
);

-- Tasks table
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    project_id TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    due_date TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
CREATE INDEX IF NOT EXISTS idx_accounts_user_id ON accounts(user_id);
CREATE INDEX IF NOT EXISTS idx_members_user_id ON organization_members(user_id);
CREATE INDEX IF NOT EXISTS idx_projects_organization_id ON projects(organization_id);
CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, email, name, image, role, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, name, image, role, created_at, updated_at
FROM users
WHERE id = ?
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, name, image, role, created_at, updated_at
FROM users
WHERE email = ?
"#;

pub const UPDATE_USER: &str = r#"
UPDATE users
SET name = ?, image = ?, role = ?, updated_at = ?
WHERE id = ?
"#;

// Account queries
pub const INSERT_ACCOUNT: &str = r#"
INSERT INTO accounts (id, user_id, provider, provider_account_id, linked_at)
VALUES (?, ?, ?, ?, ?)
"#;

pub const SELECT_ACCOUNT_BY_PROVIDER: &str = r#"
SELECT id, user_id, provider, provider_account_id, linked_at
FROM accounts
WHERE provider = ? AND provider_account_id = ?
"#;

// Ordering matters: session enrichment picks the first row.
pub const SELECT_ACCOUNTS_FOR_USER: &str = r#"
SELECT id, user_id, provider, provider_account_id, linked_at
FROM accounts
WHERE user_id = ?
ORDER BY linked_at ASC, id ASC
"#;

// Organization queries
pub const INSERT_ORGANIZATION: &str = r#"
INSERT INTO organizations (id, name, slug, description, plan_type, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_ORGANIZATION_BY_SLUG: &str = r#"
SELECT id, name, slug, description, plan_type, created_at
FROM organizations
WHERE slug = ?
"#;

pub const UPSERT_MEMBER: &str = r#"
INSERT INTO organization_members (user_id, organization_id, role, joined_at)
VALUES (?, ?, ?, ?)
ON CONFLICT (user_id, organization_id) DO UPDATE SET role = excluded.role
"#;

pub const SELECT_ORGANIZATIONS_FOR_USER: &str = r#"
SELECT o.id, o.name, o.slug, o.description, o.plan_type, o.created_at, m.role
FROM organizations o
INNER JOIN organization_members m ON o.id = m.organization_id
WHERE m.user_id = ?
ORDER BY o.created_at ASC
"#;

// Project queries
pub const INSERT_PROJECT: &str = r#"
INSERT INTO projects (id, name, description, organization_id, is_public, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_PROJECT_BY_ID: &str = r#"
SELECT id, name, description, organization_id, is_public, created_at
FROM projects
WHERE id = ?
"#;

pub const SELECT_PROJECTS_FOR_ORGANIZATION: &str = r#"
SELECT id, name, description, organization_id, is_public, created_at
FROM projects
WHERE organization_id = ?
ORDER BY created_at ASC
"#;

// Task queries
pub const INSERT_TASK: &str = r#"
INSERT INTO tasks (id, title, description, project_id, completed, due_date, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub const SELECT_TASKS_FOR_PROJECT: &str = r#"
SELECT id, title, description, project_id, completed, due_date, created_at
FROM tasks
WHERE project_id = ?
ORDER BY created_at DESC
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_covers_every_entity() {
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS accounts"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS organizations"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS organization_members"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS projects"));
        assert!(CREATE_TABLES.contains("CREATE TABLE IF NOT EXISTS tasks"));
    }

    #[test]
    fn test_account_listing_is_explicitly_ordered() {
        assert!(SELECT_ACCOUNTS_FOR_USER.contains("ORDER BY linked_at ASC, id ASC"));
    }

    #[test]
    fn test_upsert_member_replaces_role() {
        assert!(UPSERT_MEMBER.contains("ON CONFLICT"));
        assert!(UPSERT_MEMBER.contains("DO UPDATE SET role"));
    }
}
