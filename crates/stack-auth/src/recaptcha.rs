use std::future::Future;

use serde::Deserialize;
use tracing::warn;

use crate::error::AuthError;

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Checks an opaque bot-challenge token.
pub trait BotVerifier: Send + Sync {
    fn verify(&self, token: &str) -> impl Future<Output = Result<bool, AuthError>> + Send;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: Option<String>,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret: secret.filter(|s| !s.trim().is_empty()),
            endpoint: SITEVERIFY_URL.to_string(),
        }
    }

    /// Reads `RECAPTCHA_SECRET_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("RECAPTCHA_SECRET_KEY").ok())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<bool, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        let secret = self
            .secret
            .as_deref()
            .ok_or(AuthError::NotConfigured("RECAPTCHA_SECRET_KEY"))?;

        let body = self
            .client
            .post(&self.endpoint)
            .query(&[("secret", secret), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: SiteVerifyResponse = serde_json::from_str(&body)?;
        if !response.success {
            warn!("reCAPTCHA rejected token: {:?}", response.error_codes);
        }
        Ok(response.success)
    }
}
