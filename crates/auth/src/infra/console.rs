//! Console Delivery Adapter
//!
//! Development transport: prints the code instead of emailing it.

use crate::domain::entity::otp_challenge::OtpChallenge;
use crate::domain::repository::{DeliveryOutcome, OtpDelivery};
use crate::error::AuthResult;

/// Writes the code to the log.
///
/// Reports `Confirmed` - unlike an email provider, the terminal puts
/// the code in front of the user synchronously.
#[derive(Debug, Default, Clone)]
pub struct ConsoleOtpDelivery;

impl OtpDelivery for ConsoleOtpDelivery {
    async fn send(&self, challenge: &OtpChallenge) -> AuthResult<DeliveryOutcome> {
        tracing::info!(
            recipient = %challenge.recipient,
            display_name = %challenge.display_name,
            code = challenge.code().as_str(),
            "Development delivery: verification code shown above"
        );
        Ok(DeliveryOutcome::Confirmed)
    }
}
