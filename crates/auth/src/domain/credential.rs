//! Federated Credential Decoding
//!
//! Pure transform from a raw bearer token to an [`IdentityClaim`].
//!
//! The token is expected to be a JWT-shaped string: three dot-separated
//! base64url segments with a JSON claim payload in the middle. The
//! signature is **not** verified here - the federated provider's own
//! script is trusted to have validated the token before handing it
//! over. That is a deliberate, documented trust boundary of this
//! client-side design, not an oversight.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::domain::entity::identity_claim::IdentityClaim;
use crate::error::{AuthError, AuthResult};

/// Decode an unverified federated token into its claim set.
///
/// Fails with [`AuthError::CredentialDecode`] when the token lacks the
/// three-segment structure, the payload is not valid base64url, or the
/// decoded payload is not a JSON object carrying all required claims.
pub fn decode(raw_token: &str) -> AuthResult<IdentityClaim> {
    let mut segments = raw_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::CredentialDecode(
            "expected three dot-separated segments".into(),
        ));
    };

    // JWT payloads are unpadded base64url; strip padding for tolerance
    // of transports that re-add it
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::CredentialDecode(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::CredentialDecode(format!("payload is not a valid claim set: {e}")))
}
