//! OIDC provider implementations.
//!
//! `ProviderClient` implementations for:
//! - Azure AD (tenant-scoped issuer)
//! - Google

mod azure;
mod google;

pub use azure::AzureAdProvider;
pub use google::GoogleProvider;

use openidconnect::{
    core::CoreClient, EndpointMaybeSet, EndpointNotSet, EndpointSet,
};

/// A `CoreClient` configured from discovered provider metadata.
///
/// `from_provider_metadata` returns a client with the auth URL always set
/// and the token/userinfo URLs maybe-set; `set_redirect_uri` preserves
/// those type parameters.
pub(crate) type ConfiguredCoreClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;
