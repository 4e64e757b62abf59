//! Value Object Module

pub mod email;
pub mod otp_code;
