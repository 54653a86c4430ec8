use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::mailer::{Email, Mailer};
use crate::session::{Session, create_token};

pub const CODE_TTL_MINUTES: i64 = 10;

/// Outcome of requesting a sign-in code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub delivered: bool,
    /// Handed back only when delivery failed, so a demo can still sign in.
    pub code: Option<String>,
}

struct PendingCode {
    code_hash: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    verified: bool,
}

/// One-time six-digit codes keyed by email. Only hashes are kept.
pub struct VerificationService<M> {
    mailer: M,
    jwt_secret: String,
    codes: Mutex<HashMap<String, Vec<PendingCode>>>,
}

impl<M: Mailer> VerificationService<M> {
    pub fn new(mailer: M, jwt_secret: impl Into<String>) -> Self {
        Self {
            mailer,
            jwt_secret: jwt_secret.into(),
            codes: Mutex::new(HashMap::new()),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Issue a code and email it. A failed delivery is logged, not returned
    /// as an error: the code stays valid.
    pub async fn send_code(&self, email: &str) -> Result<SentCode, AuthError> {
        let email = normalize_email(email)?;
        let code = self.issue_code(&email, Utc::now());

        let delivered = self
            .mailer
            .send(Email::verification_code(&email, &code, CODE_TTL_MINUTES))
            .await;

        if delivered {
            Ok(SentCode { delivered, code: None })
        } else {
            warn!("Verification email to {} not delivered; returning code to caller", email);
            Ok(SentCode { delivered, code: Some(code) })
        }
    }

    /// Check a code and open a session.
    pub fn verify(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        self.verify_at(email, code, Utc::now())
    }

    pub(crate) fn issue_code(&self, email: &str, now: DateTime<Utc>) -> String {
        let code = rand::rng().random_range(100_000..=999_999u32).to_string();

        self.with_codes(|codes| {
            prune(codes, now);
            codes.entry(email.to_string()).or_default().push(PendingCode {
                code_hash: hash_code(&code),
                issued_at: now,
                expires_at: now + Duration::minutes(CODE_TTL_MINUTES),
                verified: false,
            });
        });

        debug!("Issued verification code for {}", email);
        code
    }

    /// Accepts the most recent unexpired, unused code matching `code`.
    pub(crate) fn verify_at(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        let code_hash = hash_code(code.trim());

        self.with_codes(|codes| -> Result<(), AuthError> {
            let accepted = codes
                .get_mut(&email)
                .and_then(|entries| {
                    entries
                        .iter_mut()
                        .filter(|p| !p.verified && p.expires_at > now && p.code_hash == code_hash)
                        .max_by_key(|p| p.issued_at)
                })
                .map(|pending| pending.verified = true)
                .is_some();

            prune(codes, now);
            if accepted { Ok(()) } else { Err(AuthError::InvalidCode) }
        })?;

        let token = create_token(&self.jwt_secret, &email)?;
        info!("{} signed in", email);
        Ok(Session { email, token })
    }

    fn with_codes<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut HashMap<String, Vec<PendingCode>>) -> T,
    {
        let mut codes = self.codes.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut codes)
    }
}

/// Drop used and expired codes, and emails left with none.
fn prune(codes: &mut HashMap<String, Vec<PendingCode>>, now: DateTime<Utc>) {
    codes.retain(|_, entries| {
        entries.retain(|p| !p.verified && p.expires_at > now);
        !entries.is_empty()
    });
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}
