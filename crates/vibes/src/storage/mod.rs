//! Storage backends implementing the repository traits from
//! `vibes_core::storage`.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
