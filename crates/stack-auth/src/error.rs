use thiserror::Error;

/// Display strings are short enough to show next to the form control.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Invalid or expired code")]
    InvalidCode,

    #[error("reCAPTCHA token is required")]
    MissingToken,

    #[error("{0} is not set")]
    NotConfigured(&'static str),

    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected verification response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("session token rejected: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
