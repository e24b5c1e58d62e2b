//! Federated authentication for vibes.
//!
//! This crate provides:
//! - OIDC authorization-code + PKCE flows for Azure AD and Google
//! - Session storage (SQLite or in-memory)
//! - Session enrichment (user fields + provider label per session read)
//! - The route-guard middleware and axum extractors

mod config;
mod error;
mod extractors;
mod guard;
mod handlers;
mod providers;
mod session;
mod sessions;
mod state;
#[cfg(test)]
mod test_support;

pub use config::{AuthConfig, AzureAdConfig, ProviderConfig};
pub use error::AuthError;
pub use extractors::{CurrentUser, OptionalSession, OptionalUser};
pub use guard::route_guard;
pub use handlers::auth_routes;
pub use providers::{AzureAdProvider, GoogleProvider};
pub use session::{enrich_session, resolve_session, SessionView};
pub use sessions::{MemorySessionStore, SqliteSessionStore};
pub use state::AuthState;
