//! Session storage implementations.
//!
//! `SessionRepository` implementations backed by SQLite (production) and by
//! in-process maps (tests and demo mode). Both are always compiled; the
//! binary picks one at startup based on configuration.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;
