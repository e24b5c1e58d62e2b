//! Pure authentication domain: session types, the route-guard policy,
//! sign-in error classification, and the provider abstractions.

mod error;
mod functions;
pub mod guard;
mod signin;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    calculate_expiry, derive_provider, generate_session_id, generate_state, is_auth_flow_expired,
    is_session_expired, AUTH_FLOW_TTL_MINUTES, UNKNOWN_PROVIDER,
};
pub use signin::{provider_label, SignInError};
pub use traits::{ProviderClient, Result, SessionRepository};
pub use types::{AuthFlow, IdentityProvider, OidcClaims, Session, SessionId, SessionUser};
pub use validation::validate_callback_url;
