use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Bearer token claims. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Why a presented token was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed")]
    Malformed,

    #[error("JWT generation error: {0}")]
    Generation(String),
}

/// Signs and verifies HS256 access tokens with the shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenCodec {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    pub fn new(secret: &str, expiry_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Self::ALGORITHM),
            expiry: Duration::minutes(expiry_minutes),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.secret_key, security.jwt_expiry_minutes)
    }

    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    fn issue_at(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Self::ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify signature, algorithm and expiry, then return the subject id.
    pub fn decode(&self, token: &str) -> Result<Uuid, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", 60)
    }

    #[test]
    fn issued_token_decodes_to_subject() {
        let id = Uuid::new_v4();
        let token = codec().issue(id).unwrap();
        assert_eq!(codec().decode(&token), Ok(id));
    }

    #[test]
    fn expired_token_is_rejected() {
        let id = Uuid::new_v4();
        let token = codec()
            .issue_at(id, Utc::now() - Duration::hours(3))
            .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenCodec::new("other-secret", 60).issue(Uuid::new_v4()).unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(codec().decode("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(codec().decode(""), Err(TokenError::Malformed));
    }

    #[test]
    fn non_uuid_subject_is_malformed() {
        let claims = Claims {
            sub: "admin".to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(codec().decode(&token), Err(TokenError::Malformed));
    }
}
