//! Storage abstractions implemented by the SQLite and in-memory backends.

mod error;
mod traits;

pub use error::StorageError;
pub use traits::{
    AccountRepository, OrganizationRepository, ProjectRepository, Result, TaskRepository,
    UserRepository,
};
