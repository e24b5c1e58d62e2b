//! Demo data seeding (`vibes --seed`).
//!
//! Every step is an upsert keyed on a natural identifier, so re-running the
//! seed against an existing database is a no-op.

use chrono::{Duration, Utc};
use vibes_core::model::{
    Organization, OrganizationMember, OrganizationRole, PlanType, Project, Task, User, UserRole,
};

use crate::state::AppState;

/// Seeds the sample tenant: two users, one organization, one project,
/// three tasks.
pub async fn seed(state: &AppState) -> anyhow::Result<()> {
    let admin = ensure_user(
        state,
        User::new("admin@example.com")
            .with_name("Admin User")
            .with_role(UserRole::Admin),
    )
    .await?;
    let member = ensure_user(
        state,
        User::new("user@example.com").with_name("Regular User"),
    )
    .await?;

    let organization = match state.organizations.get_organization_by_slug("acme-corp").await? {
        Some(existing) => existing,
        None => {
            let organization = Organization::new("Acme Corp", "acme-corp")
                .with_description("A sample organization")
                .with_plan(PlanType::Pro);
            state.organizations.create_organization(&organization).await?;
            tracing::info!(slug = %organization.slug, "seeded organization");
            organization
        }
    };

    state
        .organizations
        .upsert_member(&OrganizationMember::owner(admin.id, organization.id))
        .await?;
    state
        .organizations
        .upsert_member(&OrganizationMember::new(
            member.id,
            organization.id,
            OrganizationRole::Member,
        ))
        .await?;

    let project = match state
        .projects
        .projects_for_organization(organization.id)
        .await?
        .into_iter()
        .find(|p| p.name == "Sample Project")
    {
        Some(existing) => existing,
        None => {
            let project = Project::new("Sample Project", organization.id)
                .with_description("A sample project to get you started");
            state.projects.create_project(&project).await?;
            tracing::info!(name = %project.name, "seeded project");
            project
        }
    };

    if state.tasks.tasks_for_project(project.id).await?.is_empty() {
        let tasks = [
            Task::new("Set up the development environment", project.id).completed(),
            Task::new("Review the onboarding docs", project.id)
                .with_due_date(Utc::now() + Duration::days(3)),
            Task::new("Invite your teammates", project.id)
                .with_due_date(Utc::now() + Duration::days(7)),
        ];
        for task in &tasks {
            state.tasks.create_task(task).await?;
        }
        tracing::info!(count = tasks.len(), "seeded tasks");
    }

    Ok(())
}

async fn ensure_user(state: &AppState, user: User) -> anyhow::Result<User> {
    match state.users.get_user_by_email(&user.email).await? {
        Some(existing) => Ok(existing),
        None => {
            state.users.create_user(&user).await?;
            tracing::info!(email = %user.email, role = %user.role, "seeded user");
            Ok(user)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let state = AppState::default();

        seed(&state).await.unwrap();
        seed(&state).await.unwrap();

        let admin = state
            .users
            .get_user_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let organization = state
            .organizations
            .get_organization_by_slug("acme-corp")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(organization.plan_type, PlanType::Pro);

        let orgs = state
            .organizations
            .organizations_for_user(admin.id)
            .await
            .unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].1, OrganizationRole::Owner);

        let projects = state
            .projects
            .projects_for_organization(organization.id)
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);

        let tasks = state
            .tasks
            .tasks_for_project(projects[0].id)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 3);
    }
}
