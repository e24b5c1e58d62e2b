//! Domain models shared across the workspace.

mod types;

pub use types::{
    Account, Organization, OrganizationMember, OrganizationRole, PlanType, Project, Task, User,
    UserRole,
};
