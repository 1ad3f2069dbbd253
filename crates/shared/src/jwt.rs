//! JWT token validation (and dev-token minting).
//!
//! Daura trusts the identity provider's signatures; this service verifies
//! bearer tokens against the shared secret. Minting is kept only so the
//! seeder and tests can produce usable tokens locally.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Claims;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider.
    pub secret: String,
    /// Token expiration in seconds (used when minting).
    pub token_expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            token_expiry_secs: 900,
        }
    }
}

impl From<&crate::config::JwtConfig> for JwtConfig {
    fn from(cfg: &crate::config::JwtConfig) -> Self {
        Self {
            secret: cfg.secret.clone(),
            token_expiry_secs: cfg.token_expiry_secs,
        }
    }
}

/// Errors from minting or verifying tokens.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signing a new token failed.
    #[error("token encoding failed: {0}")]
    EncodingError(String),

    /// The token is malformed or its signature does not verify.
    #[error("token decoding failed: {0}")]
    DecodingError(String),

    /// The token's `exp` claim is in the past.
    #[error("token has expired")]
    Expired,
}

/// Verifies (and, for development, mints) bearer tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &"[hidden]")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints a token for an account. Development and test use only; in
    /// production tokens come from the identity provider.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn mint_token(&self, account_id: Uuid, role: &str) -> Result<String, JwtError> {
        let expiry = i64::try_from(self.config.token_expiry_secs).unwrap_or(i64::MAX);
        let expires_at = Utc::now() + Duration::seconds(expiry);
        let claims = Claims::new(account_id, role, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed or the
    /// signature does not verify.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}
