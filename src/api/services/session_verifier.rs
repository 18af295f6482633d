//! Session token verification.
//!
//! Identity is delegated to a hosted provider; requests arrive with the
//! provider's session JWT in the Authorization header. Tokens are verified
//! locally against the shared HS256 secret. The subject claim is the opaque
//! user identifier used everywhere downstream.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Verifier for identity-provider session tokens.
#[derive(Clone)]
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionVerifier {
    /// Create a verifier with the given shared secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Create a verifier from environment variables.
    ///
    /// In production (APP_ENV != "development"), this will panic if JWT_SECRET
    /// is not set. In development, falls back to an insecure default secret
    /// with a warning.
    ///
    /// # Panics
    /// Panics in production if JWT_SECRET is not set.
    pub fn from_env() -> Self {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
        let is_development = app_env.to_lowercase() == "development";

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) => s,
            Err(_) => {
                if is_development {
                    warn!(
                        "JWT_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!"
                    );
                    "dev-secret-do-not-use-in-production-change-me-now".to_string()
                } else {
                    panic!(
                        "CRITICAL: JWT_SECRET environment variable is required in production. Set APP_ENV=development to use default secret."
                    );
                }
            }
        };

        Self::new(&secret)
    }

    /// Validate a session token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// Mint a session token. Used by tests and local development; in
    /// production the identity provider mints tokens.
    pub fn issue(
        &self,
        user_id: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Extract the token from an "Authorization: Bearer <token>" header value.
    pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
        header_value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
