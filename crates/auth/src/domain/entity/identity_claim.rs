//! Identity Claim Entity
//!
//! Canonical claim set extracted from a federated identity token.

use serde::Deserialize;

/// Claims this subsystem needs from a federated token payload.
///
/// All fields are required; a payload missing any of them fails
/// decoding. Values are opaque strings trusted from the provider's
/// token - the email in particular is a uniqueness anchor, not a
/// locally verified fact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityClaim {
    /// Provider-scoped stable subject identifier
    #[serde(rename = "sub")]
    pub subject_id: String,
    /// Display name
    #[serde(rename = "name")]
    pub display_name: String,
    /// Email address as asserted by the provider
    pub email: String,
    /// Profile image URL
    #[serde(rename = "picture")]
    pub avatar_url: String,
}
