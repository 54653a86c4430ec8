use std::future::Future;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tracing::{error, info};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    /// HTML body
    pub body: String,
}

impl Email {
    pub fn verification_code(to: &str, code: &str, ttl_minutes: i64) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your Verification Code".to_string(),
            body: format!(
                "<h1>Your Verification Code</h1>\
                 <p>Enter this code to sign in to Stack:</p>\
                 <div style=\"font-size: 32px; font-weight: bold; letter-spacing: 8px;\">{}</div>\
                 <p>This code will expire in {} minutes.</p>\
                 <p>If you didn't request this code, you can safely ignore this email.</p>",
                code, ttl_minutes
            ),
        }
    }
}

/// Transactional email delivery. Returns whether the provider accepted
/// the message; callers treat `false` as non-fatal.
pub trait Mailer: Send + Sync {
    fn send(&self, email: Email) -> impl Future<Output = bool> + Send;
}

pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from_email: String,
    from_name: String,
}

impl SendGridMailer {
    pub fn new(api_key: Option<String>, from_email: String, from_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            from_email,
            from_name,
        }
    }

    /// Reads `SENDGRID_API_KEY`, `SENDGRID_FROM_EMAIL` and `SENDGRID_FROM_NAME`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("SENDGRID_API_KEY").ok(),
            std::env::var("SENDGRID_FROM_EMAIL").unwrap_or_else(|_| "no-reply@stack.local".into()),
            std::env::var("SENDGRID_FROM_NAME").unwrap_or_else(|_| "Stack".into()),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> bool {
        let Some(api_key) = &self.api_key else {
            info!("No SendGrid API key configured, skipping email to {}", email.to);
            return false;
        };

        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [{ "type": "text/html", "value": email.body }],
        });

        let result = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await;

        match result {
            Ok(resp) if resp.status() == StatusCode::ACCEPTED => {
                info!("Email sent to {}", email.to);
                true
            }
            Ok(resp) => {
                error!("SendGrid returned {} for {}", resp.status(), email.to);
                false
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", email.to, e);
                false
            }
        }
    }
}
