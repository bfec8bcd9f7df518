//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user ID in an `_id` claim and expiring
//! seven days after issuance. Nothing is stored server-side; a token is valid
//! exactly as long as its signature and `exp` check out.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use babytrack_core::UserId;

/// How long an issued token stays valid, in days.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, tampered, wrongly signed, or expired token.
    ///
    /// The cause is intentionally not carried: callers must not be able to
    /// tell these cases apart.
    #[error("invalid or expired token")]
    Invalid,

    /// Signing a new token failed.
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "_id")]
    user_id: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies bearer tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
        }
    }

    /// Issue a token for `user_id`, valid for [`TOKEN_TTL_DAYS`] from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the token cannot be encoded.
    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now + Duration::days(TOKEN_TTL_DAYS);
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify a token and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for any token that is not a current,
    /// correctly signed token from this service.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                TokenError::Invalid
            })?;

        data.claims.user_id.parse().map_err(|_| {
            tracing::debug!("token subject is not a user id");
            TokenError::Invalid
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&SecretString::from(secret))
    }

    const SECRET: &str = "kT9#vR2$mQ7!xL4@pW8^nB3&zC6*hJ1%";

    #[test]
    fn test_issued_token_verifies() {
        let tokens = service(SECRET);
        let user = UserId::generate();

        let token = tokens.issue(user).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_token_valid_until_seven_days() {
        let tokens = service(SECRET);
        let user = UserId::generate();

        let six_days_ago = Utc::now() - Duration::days(6);
        let token = tokens.issue_at(user, six_days_ago).unwrap();

        assert_eq!(tokens.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_token_rejected_after_seven_days() {
        let tokens = service(SECRET);

        let eight_days_ago = Utc::now() - Duration::days(8);
        let token = tokens.issue_at(UserId::generate(), eight_days_ago).unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = service("a-completely-different-signing-key-123")
            .issue(UserId::generate())
            .unwrap();

        assert!(matches!(
            service(SECRET).verify(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service(SECRET);
        for token in ["", "abc", "a.b.c", "Bearer x.y.z"] {
            assert!(matches!(tokens.verify(token), Err(TokenError::Invalid)));
        }
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service(SECRET);
        let token = tokens.issue(UserId::generate()).unwrap();
        let other = tokens.issue(UserId::generate()).unwrap();

        // Header and signature from one token, payload from another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(tokens.verify(&forged), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", service(SECRET));
        assert!(!debug.contains(SECRET));
    }
}
