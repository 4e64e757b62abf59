//! Session Entity
//!
//! The single local record meaning "a user is signed in".
//!
//! A session exists if and only if the user is authenticated, and at
//! most one exists at a time - creating a new one fully replaces any
//! prior one. The serialized (camelCase) form is what the session
//! store persists.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::entity::identity_claim::IdentityClaim;
use crate::domain::value_object::email::Email;

/// Authenticated session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Federated subject id, or `email-<unix-millis>` for OTP sessions
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Provider profile image, or a generated placeholder for OTP sessions
    pub avatar_url: String,
}

impl Session {
    /// Materialize a session from a decoded federated claim set
    pub fn from_claim(claim: IdentityClaim) -> Self {
        Self {
            id: claim.subject_id,
            name: claim.display_name,
            email: claim.email,
            avatar_url: claim.avatar_url,
        }
    }

    /// Synthesize a session for a verified OTP challenge.
    ///
    /// OTP sign-ins have no provider-issued subject id, so one is
    /// derived from the issuance instant, and no provider avatar, so a
    /// placeholder image URL is generated from the display name.
    pub fn from_verified_otp(recipient: &Email, display_name: &str) -> Self {
        Self {
            id: format!("email-{}", Utc::now().timestamp_millis()),
            name: display_name.to_string(),
            email: recipient.as_str().to_string(),
            avatar_url: placeholder_avatar_url(display_name),
        }
    }
}

/// Placeholder avatar for sessions without a provider image.
///
/// Spaces become `+` and anything outside a small safe set is dropped,
/// keeping the URL valid without pulling in a full percent-encoder.
fn placeholder_avatar_url(display_name: &str) -> String {
    let encoded: String = display_name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' => Some(c),
            _ => None,
        })
        .collect();

    format!("https://ui-avatars.com/api/?name={encoded}&background=random")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claim_maps_fields_exactly() {
        let claim = IdentityClaim {
            subject_id: "u1".into(),
            display_name: "A".into(),
            email: "a@x.com".into(),
            avatar_url: "p".into(),
        };

        let session = Session::from_claim(claim);
        assert_eq!(session.id, "u1");
        assert_eq!(session.name, "A");
        assert_eq!(session.email, "a@x.com");
        assert_eq!(session.avatar_url, "p");
    }

    #[test]
    fn test_from_verified_otp_synthesizes_id() {
        let recipient = Email::new("b@y.com").unwrap();
        let session = Session::from_verified_otp(&recipient, "Bob");

        assert!(session.id.starts_with("email-"));
        assert!(session.id["email-".len()..].parse::<i64>().is_ok());
        assert_eq!(session.name, "Bob");
        assert_eq!(session.email, "b@y.com");
        assert!(session.avatar_url.contains("name=Bob"));
    }

    #[test]
    fn test_placeholder_avatar_encodes_spaces() {
        let url = placeholder_avatar_url("Bob The Builder");
        assert!(url.contains("name=Bob+The+Builder"));
    }

    #[test]
    fn test_serialized_shape_is_camel_case() {
        let session = Session {
            id: "u1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            avatar_url: "p".into(),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["avatarUrl"], "p");
        assert!(json.get("avatar_url").is_none());
    }
}
