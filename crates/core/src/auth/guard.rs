//! Route-guard policy: which request paths require an authenticated session.
//!
//! The policy is a pure function of the path component; query string and
//! fragment are never consulted. The middleware in `vibes_auth` applies it
//! and performs the actual session lookup, so the deny decision lives here
//! rather than being delegated to any outer layer.

/// Path prefixes that require an authenticated session.
pub const PROTECTED_PREFIXES: [&str; 4] = ["/dashboard", "/admin", "/profile", "/settings"];

/// Prefixes excluded from the guard before classification: the auth flow
/// itself, bundled static assets, and the favicon.
const EXEMPT_PREFIXES: [&str; 2] = ["/auth", "/dist"];

/// Image assets are always public regardless of where they live.
const EXEMPT_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".gif", ".svg"];

/// Where the guard sends unauthenticated requests.
pub const SIGNIN_PATH: &str = "/auth/signin";

/// Classification of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No session required.
    Public,
    /// A valid session is required; otherwise redirect to sign-in.
    Protected,
}

/// Classify a request path against the protected-prefix list.
pub fn classify_path(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::Protected
    } else {
        RouteClass::Public
    }
}

/// Whether the guard skips this path entirely (matched upstream of the
/// protected/public decision).
pub fn is_exempt_path(path: &str) -> bool {
    if path == "/favicon.ico" {
        return true;
    }

    if EXEMPT_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return true;
    }

    EXEMPT_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Build the sign-in redirect target carrying the originally requested path.
///
/// The path is used verbatim: it is already a valid URL path component, and
/// the sign-in page reads everything after `callbackUrl=` back out of it.
pub fn signin_redirect(requested_path: &str) -> String {
    format!("{SIGNIN_PATH}?callbackUrl={requested_path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_prefixes_are_protected() {
        for path in ["/dashboard", "/admin/users", "/profile", "/settings/billing"] {
            assert_eq!(classify_path(path), RouteClass::Protected, "{path}");
        }
    }

    #[test]
    fn everything_else_is_public() {
        for path in ["/", "/about", "/auth/signin", "/api/debug/env", "/pricing"] {
            assert_eq!(classify_path(path), RouteClass::Public, "{path}");
        }
    }

    #[test]
    fn matching_is_by_prefix_not_segment() {
        // Prefix semantics, same as the original matcher list.
        assert_eq!(classify_path("/dashboard-beta"), RouteClass::Protected);
    }

    #[test]
    fn exemptions_cover_auth_assets_and_images() {
        assert!(is_exempt_path("/auth/signin"));
        assert!(is_exempt_path("/auth/google/callback"));
        assert!(is_exempt_path("/dist/app.css"));
        assert!(is_exempt_path("/favicon.ico"));
        assert!(is_exempt_path("/logo.svg"));
        assert!(is_exempt_path("/images/hero.png"));
        assert!(!is_exempt_path("/dashboard"));
        assert!(!is_exempt_path("/"));
    }

    #[test]
    fn signin_redirect_carries_original_path() {
        assert_eq!(
            signin_redirect("/dashboard"),
            "/auth/signin?callbackUrl=/dashboard"
        );
        assert_eq!(
            signin_redirect("/settings/billing"),
            "/auth/signin?callbackUrl=/settings/billing"
        );
    }
}
