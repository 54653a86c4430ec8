use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

const SESSION_DAYS: i64 = 30;

/// Session token claims; sessions are keyed by email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub token: String,
}

pub fn create_token(secret: &str, email: &str) -> Result<String, AuthError> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_session(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let token = create_token("secret", "alice@example.com").unwrap();
        let claims = decode_session("secret", &token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
    }

    #[test]
    fn wrong_secret_fails() {
        let token = create_token("secret", "alice@example.com").unwrap();
        assert!(matches!(decode_session("other", &token), Err(AuthError::Token(_))));
    }
}
