//! Entity Module

pub mod identity_claim;
pub mod otp_challenge;
pub mod session;
