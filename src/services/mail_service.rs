use async_trait::async_trait;
use log::{error, info};
use serde::Serialize;

use crate::{config::MailConfig, error::CruiseError};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Outbound mail capability used by the confirmation and facility endpoints.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> Result<(), CruiseError>;

    /// Whether the mailer has what it needs to send anything.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct SendGridAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization {
    to: Vec<SendGridAddress>,
}

#[derive(Debug, Serialize)]
struct SendGridContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct SendGridRequest {
    personalizations: Vec<SendGridPersonalization>,
    from: SendGridAddress,
    subject: String,
    content: Vec<SendGridContent>,
}

pub struct SendGridMailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl SendGridMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, to: &str, subject: &str, html_body: &str) -> SendGridRequest {
        SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress {
                    email: to.to_string(),
                    name: None,
                }],
            }],
            from: SendGridAddress {
                email: self.config.from_email.clone(),
                name: Some(self.config.from_name.clone()),
            },
            subject: subject.to_string(),
            content: vec![SendGridContent {
                content_type: "text/html",
                value: html_body.to_string(),
            }],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> Result<(), CruiseError> {
        let api_key = self
            .config
            .sendgrid_api_key
            .as_deref()
            .ok_or_else(|| CruiseError::Mail("SENDGRID_API_KEY not set".to_string()))?;

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.request(to, subject, html_body))
            .send()
            .await
            .map_err(|e| CruiseError::Mail(e.to_string()))?;

        if response.status().is_success() {
            info!("Mail '{}' sent to {}", subject, to);
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("SendGrid rejected mail to {}: {} {}", to, status, body);
            Err(CruiseError::Mail(format!("Status: {}, Body: {}", status, body)))
        }
    }

    fn is_configured(&self) -> bool {
        self.config.sendgrid_api_key.is_some()
    }
}
