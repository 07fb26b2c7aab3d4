use crate::auth::Identity;
use crate::error::AppError;
use crate::models::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifetime of an issued token.
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: String,
    /// Role of the user at the time the token was issued.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed token or expired.
    InvalidToken,
    /// Signature is valid but the token names no user.
    MissingSubject,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidToken => write!(f, "Invalid token"),
            TokenError::MissingSubject => write!(f, "Missing user id"),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Unauthenticated(error.to_string())
    }
}

/// Issues and verifies HS256 tokens with a secret fixed at startup.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::minutes(TOKEN_TTL_MINUTES))
    }

    /// Same as `new` with a custom lifetime. A negative `ttl` yields tokens
    /// that are already expired.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Generates a token for `user_id` carrying `role`.
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        self.sign(&user_id.to_string(), role)
    }

    fn sign(&self, subject: &str, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and returns the identity it asserts.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidToken)?;

        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| TokenError::InvalidToken)?;

        Ok(Identity {
            user_id,
            role: claims.role,
        })
    }
}
