/// Validates a `callbackUrl` query value to prevent open redirects.
///
/// Returns `Some(url)` only for relative paths:
/// - must start with a single `/`
/// - `//host` protocol-relative URLs are rejected
/// - control characters are rejected
/// - anything containing `://` (absolute URLs, `javascript:` etc.) is rejected
pub fn validate_callback_url(url: &str) -> Option<&str> {
    if !url.starts_with('/') || url.starts_with("//") {
        return None;
    }

    if url.chars().any(|c| c.is_control()) {
        return None;
    }

    if url.contains("://") {
        return None;
    }

    Some(url)
}
