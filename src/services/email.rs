// src/services/email.rs
//! Transactional email via the hosted email provider (SES)
//!
//! Used by the contact form; when unconfigured the contact handler keeps
//! the message in the database instead.

use aws_config::BehaviorVersion;
use aws_sdk_sesv2::config::{Credentials, Region};
use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use std::env;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email provider not configured")]
    NotConfigured,

    #[error("email send failed: {0}")]
    SesError(String),
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub from_email: String,
}

impl EmailConfig {
    /// Read the provider configuration from the environment; `None` when
    /// credentials or sender address are absent
    pub fn from_env() -> Option<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let from_email = env::var("SES_FROM_EMAIL").ok()?;

        Some(Self {
            access_key_id,
            secret_access_key,
            region: env::var("SES_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .unwrap_or_else(|_| "us-east-1".to_string()),
            from_email,
        })
    }
}

#[derive(Debug)]
pub struct EmailService {
    config: Option<EmailConfig>,
}

impl EmailService {
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn get_ses_client(&self) -> Result<(SesClient, &EmailConfig), EmailError> {
        let config = self.config.as_ref().ok_or(EmailError::NotConfigured)?;

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "environment",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Ok((SesClient::new(&aws_config), config))
    }

    /// Send an HTML email
    pub async fn send(
        &self,
        to: Vec<String>,
        subject: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let (client, config) = self.get_ses_client().await?;

        let destination = Destination::builder()
            .set_to_addresses(Some(to.clone()))
            .build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::SesError(format!("Failed to build subject: {}", e)))?;

        let body_content = Content::builder()
            .data(html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::SesError(format!("Failed to build body: {}", e)))?;

        let ses_body = SesBody::builder().html(body_content).build();

        let message = Message::builder()
            .subject(subject_content)
            .body(ses_body)
            .build();

        let email_content = EmailContent::builder().simple(message).build();

        let result = client
            .send_email()
            .from_email_address(&config.from_email)
            .destination(destination)
            .content(email_content)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = ?to, "Failed to send email");
                EmailError::SesError(format!("Send failed: {}", e))
            })?;

        info!(
            to = ?to,
            message_id = ?result.message_id(),
            "Email sent successfully"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_service_refuses_to_send() {
        let service = EmailService::new(None);
        assert!(!service.is_configured());

        let result = service
            .send(vec!["studio@example.com".to_string()], "subject", "<p>hi</p>")
            .await;
        assert!(matches!(result, Err(EmailError::NotConfigured)));
    }
}
