use std::env;

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend (default: sqlite)
    pub storage_backend: StorageBackend,
    /// Path to SQLite database file (default: "vibes.db")
    pub sqlite_path: String,
    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORAGE_BACKEND` - "sqlite" or "memory" (default: "sqlite")
    /// - `SQLITE_PATH` - SQLite database path (default: "vibes.db")
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    pub fn from_env() -> Self {
        let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            _ => StorageBackend::Sqlite,
        };

        Self {
            storage_backend,
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "vibes.db".to_string()),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
