//! Sign-in error classification and provider display labels.
//!
//! Purely presentational: a fixed enumeration of upstream error codes mapped
//! to human-readable messages for the sign-in page. Anything outside the
//! enumeration falls through to a generic message.

/// Classified sign-in error, parsed from the `error` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    OAuthSignin,
    OAuthCallback,
    OAuthCreateAccount,
    EmailCreateAccount,
    Callback,
    OAuthAccountNotLinked,
    SessionRequired,
    Default,
    /// Any code outside the known enumeration.
    Other,
}

impl SignInError {
    /// Parse an upstream error code.
    pub fn parse(code: &str) -> Self {
        match code {
            "OAuthSignin" => Self::OAuthSignin,
            "OAuthCallback" => Self::OAuthCallback,
            "OAuthCreateAccount" => Self::OAuthCreateAccount,
            "EmailCreateAccount" => Self::EmailCreateAccount,
            "Callback" => Self::Callback,
            "OAuthAccountNotLinked" => Self::OAuthAccountNotLinked,
            "SessionRequired" => Self::SessionRequired,
            "Default" => Self::Default,
            _ => Self::Other,
        }
    }

    /// The code as it appears in redirect query strings.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::OAuthSignin => "OAuthSignin",
            Self::OAuthCallback => "OAuthCallback",
            Self::OAuthCreateAccount => "OAuthCreateAccount",
            Self::EmailCreateAccount => "EmailCreateAccount",
            Self::Callback => "Callback",
            Self::OAuthAccountNotLinked => "OAuthAccountNotLinked",
            Self::SessionRequired => "SessionRequired",
            Self::Default => "Default",
            Self::Other => "Default",
        }
    }

    /// The message shown on the sign-in page.
    pub fn message(self) -> &'static str {
        match self {
            Self::OAuthSignin => "Error with the OAuth provider.",
            Self::OAuthCallback => "Error in handling the OAuth callback.",
            Self::OAuthCreateAccount => "Could not create OAuth account.",
            Self::EmailCreateAccount => "Could not create email account.",
            Self::Callback => "Error in the OAuth callback handler route.",
            Self::OAuthAccountNotLinked => "Email already exists with a different provider.",
            Self::SessionRequired => "Please sign in to access this page.",
            Self::Default => "Unable to sign in.",
            Self::Other => "An error occurred during sign in.",
        }
    }
}

/// Map a stored provider slug to its display label.
///
/// Unrecognized slugs (including the `"unknown"` fallback) pass through
/// unchanged.
pub fn provider_label(provider: &str) -> &str {
    match provider {
        "azure-ad" => "Microsoft Azure AD",
        "google" => "Google",
        other => other,
    }
}
