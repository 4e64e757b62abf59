//! OTP Code Value Object
//!
//! Wraps the one-time passcode sent to the user by email.
//!
//! The code is generated and checked entirely on the client; there is
//! no server-side secret behind it. That weakness is inherited from the
//! design this subsystem implements and is documented rather than fixed
//! here.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digits in a code
pub const OTP_CODE_LEN: usize = 6;

/// Inclusive generation range, guaranteeing no leading zero
const OTP_CODE_MIN: u32 = 100_000;
const OTP_CODE_MAX: u32 = 999_999;

/// One-time passcode value object
///
/// `Debug` is redacted so the code never leaks through logging or
/// error formatting. Display layers get at the digits only through
/// an explicit [`as_str`](OtpCode::as_str) call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a fresh code, uniform in [100000, 999999]
    pub fn generate() -> Self {
        use rand::Rng;
        let value = rand::rng().random_range(OTP_CODE_MIN..=OTP_CODE_MAX);
        Self(value.to_string())
    }

    /// Create from a known digit string (exactly 6 ASCII digits)
    pub fn from_digits(digits: impl Into<String>) -> AppResult<Self> {
        let digits = digits.into();

        if digits.len() != OTP_CODE_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::invalid_input(format!(
                "Code must be exactly {OTP_CODE_LEN} digits"
            )));
        }

        Ok(Self(digits))
    }

    /// Byte-exact comparison against a candidate.
    ///
    /// No trimming, no case folding: codes are digits only, and a
    /// candidate that differs in any byte fails.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes() == candidate.as_bytes()
    }

    /// The digits, for handing to the delivery adapter
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OtpCode(\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022})")
    }
}
