//! Session token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. Expiry is an
//! absolute Unix timestamp fixed at issuance, so any holder of the secret can
//! check a token without calling back into Warden.

use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use warden_core::types::UserId;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: UserId,
    pub email: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Signing configuration, fixed for the lifetime of the service.
///
/// Rotating `secret` invalidates every outstanding token.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_ttl: Duration,
}

/// Default session token lifetime in minutes.
const DEFAULT_TOKEN_TTL_MINS: u64 = 60;

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var          | Required | Default |
    /// |------------------|----------|---------|
    /// | `JWT_SECRET`     | **yes**  | --      |
    /// | `TOKEN_TTL_MINS` | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or `TOKEN_TTL_MINS` is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let ttl_mins: u64 = std::env::var("TOKEN_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_MINS.to_string())
            .parse()
            .expect("TOKEN_TTL_MINS must be a valid u64");

        Self {
            secret,
            token_ttl: Duration::from_secs(ttl_mins * 60),
        }
    }
}

/// Issue a token for `user_id`/`email` expiring `ttl` from now.
pub fn issue_token(
    user_id: UserId,
    email: &str,
    ttl: Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    issue_token_at(user_id, email, ttl, secret, chrono::Utc::now().timestamp())
}

/// Like [`issue_token`] with an explicit issue instant (Unix seconds).
pub fn issue_token_at(
    user_id: UserId,
    email: &str,
    ttl: Duration,
    secret: &str,
    now: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: now.saturating_add(ttl_secs),
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry against the current time.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    validate_token_at(token, secret, chrono::Utc::now().timestamp())
}

/// Validate a token as of `now` (Unix seconds).
///
/// A token is expired from the instant `exp` onward; no leeway is applied.
pub fn validate_token_at(
    token: &str,
    secret: &str,
    now: i64,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is compared against `now` below rather than the wall clock.
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.exp <= now {
        return Err(ErrorKind::ExpiredSignature.into());
    }
    Ok(claims)
}
