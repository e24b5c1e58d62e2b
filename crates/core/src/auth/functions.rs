use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{AuthFlow, Session, SessionId};
use crate::model::Account;

/// Fallback provider label when a user has no linked account.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// How long a pending login flow stays valid between the redirect to the
/// provider and the callback.
pub const AUTH_FLOW_TTL_MINUTES: i64 = 10;

/// Generate a cryptographically random session id.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Check if a pending login flow is too old to complete. An abandoned flow
/// whose state parameter surfaces later is treated the same as an unknown
/// state.
pub fn is_auth_flow_expired(flow: &AuthFlow, now: DateTime<Utc>) -> bool {
    flow.created_at + Duration::minutes(AUTH_FLOW_TTL_MINUTES) <= now
}

/// Calculate session expiry from creation time and TTL.
pub fn calculate_expiry(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at + ttl
}

/// Derive the session's provider label from a user's linked accounts.
///
/// The slice must already be ordered by `linked_at` (the repositories
/// guarantee this), so the first entry is the earliest-linked account.
/// A user with no accounts gets the literal `"unknown"`.
pub fn derive_provider(accounts: &[Account]) -> &str {
    accounts
        .first()
        .map(|a| a.provider.as_str())
        .unwrap_or(UNKNOWN_PROVIDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IdentityProvider;
    use uuid::Uuid;

    #[test]
    fn session_id_is_32_char_alphanumeric() {
        let id = generate_session_id();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn state_is_32_chars() {
        assert_eq!(generate_state().len(), 32);
    }

    fn session_with_expiry(expires_at: DateTime<Utc>) -> Session {
        Session {
            id: generate_session_id(),
            user_id: Uuid::new_v4(),
            provider: IdentityProvider::Google,
            created_at: expires_at - Duration::hours(1),
            expires_at,
        }
    }

    #[test]
    fn future_expiry_is_not_expired() {
        let now = Utc::now();
        assert!(!is_session_expired(
            &session_with_expiry(now + Duration::hours(1)),
            now
        ));
    }

    #[test]
    fn past_and_exact_expiry_are_expired() {
        let now = Utc::now();
        assert!(is_session_expired(
            &session_with_expiry(now - Duration::hours(1)),
            now
        ));
        assert!(is_session_expired(&session_with_expiry(now), now));
    }

    fn flow_created_at(created_at: DateTime<Utc>) -> AuthFlow {
        AuthFlow {
            pkce_verifier: "verifier".to_string(),
            provider: IdentityProvider::Google,
            created_at,
            callback_url: None,
        }
    }

    #[test]
    fn fresh_auth_flow_is_not_expired() {
        let now = Utc::now();
        assert!(!is_auth_flow_expired(
            &flow_created_at(now - Duration::minutes(1)),
            now
        ));
    }

    #[test]
    fn stale_auth_flow_is_expired() {
        let now = Utc::now();
        assert!(is_auth_flow_expired(
            &flow_created_at(now - Duration::minutes(AUTH_FLOW_TTL_MINUTES)),
            now
        ));
        assert!(is_auth_flow_expired(
            &flow_created_at(now - Duration::hours(1)),
            now
        ));
    }

    #[test]
    fn expiry_adds_ttl_to_created_at() {
        let created = Utc::now();
        assert_eq!(
            calculate_expiry(created, Duration::days(7)),
            created + Duration::days(7)
        );
    }

    #[test]
    fn no_accounts_derives_unknown() {
        assert_eq!(derive_provider(&[]), "unknown");
    }

    #[test]
    fn single_account_derives_its_provider() {
        let accounts = vec![Account::new(Uuid::new_v4(), "azure-ad", "sub-1")];
        assert_eq!(derive_provider(&accounts), "azure-ad");
    }

    #[test]
    fn first_account_wins_with_multiple_links() {
        let user = Uuid::new_v4();
        let accounts = vec![
            Account::new(user, "google", "sub-g"),
            Account::new(user, "azure-ad", "sub-a"),
        ];
        assert_eq!(derive_provider(&accounts), "google");
    }
}
