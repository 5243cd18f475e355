// ABOUTME: JWT token pairs and bcrypt password hashing for staff authentication
// ABOUTME: Issues HS256 access/refresh tokens and validates them with detailed errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

//! # Authentication
//!
//! Staff log in with username and password and receive a short-lived access
//! token plus a longer-lived refresh token. Both are HS256 JWTs signed with the
//! server secret; the `token_type` claim keeps one from being used as the other.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Utc};
use fitclub_core::constants::{auth::GENERATED_SECRET_BYTES, service_names};
use fitclub_core::models::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of token carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Authorizes API requests
    Access,
    /// Exchanged for a new access token
    Refresh,
}

impl TokenType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature, audience, or type is wrong
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is not a well-formed `JWT`
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenExpired { expired_at } => write!(
                f,
                "JWT token expired at {}",
                expired_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Self::TokenInvalid { reason } => write!(f, "JWT token is invalid: {reason}"),
            Self::TokenMalformed { details } => write!(f, "JWT token is malformed: {details}"),
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match &error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { .. } => Self::auth_invalid(error.to_string()),
            JwtValidationError::TokenMalformed { .. } => Self::auth_malformed(error.to_string()),
        }
    }
}

/// `JWT` claims for staff authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// Login name at issue time
    pub username: String,
    /// Role at issue time; requests re-read the current role
    pub role: String,
    /// Access or refresh
    pub token_type: TokenType,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
    /// Unique token identifier
    pub jti: String,
}

impl Claims {
    /// Numeric user id from `sub`
    ///
    /// # Errors
    ///
    /// Returns `AUTH_MALFORMED` when `sub` is not an integer
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::auth_malformed("Token subject is not a user id"))
    }
}

/// A freshly issued token with its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded `JWT`
    pub token: String,
    /// Expiration time
    pub expires_at: DateTime<Utc>,
}

/// Token issuing and validation
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: &[u8], access_token_minutes: i64, refresh_token_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(access_token_minutes),
            refresh_ttl: Duration::hours(refresh_token_hours),
        }
    }

    /// Issue an access token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_access_token(&self, user: &User) -> AppResult<IssuedToken> {
        self.issue(user, TokenType::Access, self.access_ttl)
    }

    /// Issue a refresh token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_refresh_token(&self, user: &User) -> AppResult<IssuedToken> {
        self.issue(user, TokenType::Refresh, self.refresh_ttl)
    }

    fn issue(&self, user: &User, token_type: TokenType, ttl: Duration) -> AppResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_owned(),
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: service_names::JWT_AUDIENCE.to_owned(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Validate a token and check it is of the expected type
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] if the token is expired, malformed,
    /// badly signed, for another audience, or of the wrong type
    pub fn validate_token(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[service_names::JWT_AUDIENCE]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))?;

        let now = Utc::now();
        if now.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(now);
            tracing::debug!(user = %claims.sub, "JWT token expired at {}", expired_at.to_rfc3339());
            return Err(JwtValidationError::TokenExpired { expired_at });
        }

        if claims.token_type != expected {
            return Err(JwtValidationError::TokenInvalid {
                reason: format!(
                    "expected {} token, got {}",
                    expected.as_str(),
                    claims.token_type.as_str()
                ),
            });
        }

        Ok(claims)
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
                reason: "Token audience does not match".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }
}

/// Hash a password with bcrypt off the async executor
///
/// # Errors
///
/// Returns an internal error if hashing fails or the blocking task panics
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Password hashing error: {e}")))
}

/// Verify a password against a bcrypt hash off the async executor
///
/// A malformed stored hash verifies as false.
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Generate a random `JWT` secret
#[must_use]
pub fn generate_jwt_secret() -> Vec<u8> {
    let mut secret = vec![0u8; GENERATED_SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitclub_core::models::UserRole;

    fn user() -> User {
        User {
            id: 7,
            username: "manager".into(),
            email: None,
            role: UserRole::Manager,
            trainer_id: None,
            is_active: true,
            created_at: Utc::now(),
            last_login: None,
            password_hash: String::new(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let manager = AuthManager::new(b"test-secret", 60, 24);
        let issued = manager.generate_access_token(&user()).unwrap();
        let claims = manager
            .validate_token(&issued.token, TokenType::Access)
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.aud, service_names::JWT_AUDIENCE);
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let manager = AuthManager::new(b"test-secret", 60, 24);
        let access = manager.generate_access_token(&user()).unwrap();
        let result = manager.validate_token(&access.token, TokenType::Refresh);
        assert!(matches!(result, Err(JwtValidationError::TokenInvalid { .. })));
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = AuthManager::new(b"test-secret", -5, 24);
        let issued = manager.generate_access_token(&user()).unwrap();
        let result = manager.validate_token(&issued.token, TokenType::Access);
        assert!(matches!(result, Err(JwtValidationError::TokenExpired { .. })));
    }

    #[test]
    fn test_wrong_secret_and_garbage_rejected() {
        let issuer = AuthManager::new(b"secret-one", 60, 24);
        let verifier = AuthManager::new(b"secret-two", 60, 24);
        let issued = issuer.generate_access_token(&user()).unwrap();
        assert!(matches!(
            verifier.validate_token(&issued.token, TokenType::Access),
            Err(JwtValidationError::TokenInvalid { .. })
        ));
        assert!(verifier
            .validate_token("not-a-jwt", TokenType::Access)
            .is_err());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hash = hash_password("admin123", 4).await.unwrap();
        assert_ne!(hash, "admin123");
        assert!(verify_password("admin123", &hash).await);
        assert!(!verify_password("wrong", &hash).await);
        assert!(!verify_password("admin123", "not-a-hash").await);
    }

    #[test]
    fn test_generated_secret_length() {
        assert_eq!(generate_jwt_secret().len(), GENERATED_SECRET_BYTES);
    }
}
