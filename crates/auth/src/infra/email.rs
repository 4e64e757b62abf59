//! HTTP Email Delivery Adapter
//!
//! Sends the code through a transactional-email HTTP API (EmailJS-style
//! request shape): the recipient, display name, and code travel as
//! template parameters alongside two fixed routing identifiers.
//!
//! A 2xx response proves the provider accepted the request, not that
//! the email reached anyone, so this adapter only ever reports
//! [`DeliveryOutcome::Submitted`].

use serde::Serialize;

use crate::domain::entity::otp_challenge::OtpChallenge;
use crate::domain::repository::{DeliveryOutcome, OtpDelivery};
use crate::error::{AuthError, AuthResult};

/// Default provider endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Routing configuration for the email provider
#[derive(Debug, Clone)]
pub struct EmailDeliveryConfig {
    /// Provider send endpoint
    pub endpoint: String,
    /// Project selector at the provider
    pub service_id: String,
    /// Message template selector at the provider
    pub template_id: String,
    /// Caller identification key
    pub public_key: String,
}

impl EmailDeliveryConfig {
    pub fn new(
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_id: service_id.into(),
            template_id: template_id.into(),
            public_key: public_key.into(),
        }
    }
}

/// Request body the provider expects
#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    otp_code: &'a str,
}

/// Delivery adapter over the provider's HTTP API
#[derive(Debug, Clone)]
pub struct HttpOtpDelivery {
    client: reqwest::Client,
    config: EmailDeliveryConfig,
}

impl HttpOtpDelivery {
    pub fn new(config: EmailDeliveryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl OtpDelivery for HttpOtpDelivery {
    async fn send(&self, challenge: &OtpChallenge) -> AuthResult<DeliveryOutcome> {
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: TemplateParams {
                to_email: challenge.recipient.as_str(),
                to_name: &challenge.display_name,
                otp_code: challenge.code().as_str(),
            },
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Delivery(format!("send request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(recipient = %challenge.recipient, %status, "Provider accepted send request");
            Ok(DeliveryOutcome::Submitted)
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(AuthError::Delivery(format!(
                "provider returned {status}: {detail}"
            )))
        }
    }
}
