use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}
