//! Email-code sign-in and the third-party collaborators behind it.

pub mod codes;
pub mod error;
pub mod mailer;
pub mod recaptcha;
pub mod session;

pub use codes::{SentCode, VerificationService};
pub use error::AuthError;
pub use mailer::{Email, Mailer, SendGridMailer};
pub use recaptcha::{BotVerifier, RecaptchaVerifier};
pub use session::{Claims, Session};
