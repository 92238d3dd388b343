//! JWT utilities for the admin surface
//!
//! There is a single admin identity configured through the environment.
//! Login compares credentials and issues a short-lived access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AdminConfig;
use crate::error::AppError;

const ADMIN_ROLE: &str = "admin";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Subject (admin username)
    pub sub: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AdminClaims {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// Token returned by a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT service for encoding and decoding admin tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    #[must_use]
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_expiry)
    }

    /// Issue an access token for `username`
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, username: &str) -> Result<AdminToken, AppError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: username.to_string(),
            role: ADMIN_ROLE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))?;

        Ok(AdminToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.token_expiry,
        })
    }

    /// Decode and validate an admin token
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or lacks the admin role
    pub fn validate(&self, token: &str) -> Result<AdminClaims, AppError> {
        let token_data = decode::<AdminClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        if !token_data.claims.is_admin() {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}

/// Compare submitted credentials against the configured admin
/// without short-circuiting on the first differing byte.
#[must_use]
pub fn credentials_match(config: &AdminConfig, username: &str, password: &str) -> bool {
    let user_ok = constant_time_eq(config.username.as_bytes(), username.as_bytes());
    let pass_ok = constant_time_eq(config.password.as_bytes(), password.as_bytes());
    user_ok & pass_ok
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_config() -> AdminConfig {
        AdminConfig {
            username: "owner".to_string(),
            password: "correct horse".to_string(),
            jwt_secret: "test-secret-key-that-is-long-enough".to_string(),
            token_expiry: 900,
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let service = JwtService::from_config(&admin_config());
        let token = service.issue("owner").unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 900);

        let claims = service.validate(&token.access_token).unwrap();
        assert_eq!(claims.sub, "owner");
        assert!(claims.is_admin());
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = JwtService::new("one-secret-key-that-is-long-enough", 900);
        let verifier = JwtService::new("another-secret-key-that-is-long", 900);
        let token = issuer.issue("owner").unwrap();

        assert!(matches!(
            verifier.validate(&token.access_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new("test-secret-key-that-is-long-enough", -120);
        let token = service.issue("owner").unwrap();

        assert!(matches!(
            service.validate(&token.access_token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::from_config(&admin_config());
        assert!(matches!(
            service.validate("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_credentials_match() {
        let config = admin_config();
        assert!(credentials_match(&config, "owner", "correct horse"));
        assert!(!credentials_match(&config, "owner", "correct horsE"));
        assert!(!credentials_match(&config, "guest", "correct horse"));
        assert!(!credentials_match(&config, "owner", ""));
    }
}
