//! Shared-secret JWT adapter for session validation.
//!
//! Validates HS256 tokens issued by the finance tracker's identity service:
//!
//! 1. Verifies the signature against the shared secret
//! 2. Checks expiry (with configurable leeway)
//! 3. Checks issuer and audience when configured
//! 4. Maps `sub` to the domain `UserId`

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Claims read from an access token.
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    /// Subject - the user ID
    sub: String,

    /// Expiry timestamp (Unix epoch seconds)
    exp: i64,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    name: Option<String>,
}

/// `SessionValidator` backed by HS256 tokens.
#[derive(Clone)]
pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    /// Creates a validator for tokens signed with `secret`.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // No audience configured: accept tokens with or without `aud`.
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Require the `iss` claim to match.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Require the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Clock skew tolerated on `exp`, in seconds.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.validation.leeway = leeway_secs;
        self
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidIssuer => {
                    tracing::warn!("Invalid issuer in token");
                    AuthError::InvalidToken
                }
                ErrorKind::InvalidAudience => {
                    tracing::warn!("Invalid audience in token");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!("Token validation failed: {}", e);
                    AuthError::InvalidToken
                }
            }
        })?;
        let claims = data.claims;

        let user_id = UserId::new(claims.sub).map_err(|_| {
            tracing::warn!("Token has an empty subject");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.name))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("iss", &self.validation.iss)
            .field("aud", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes!";

    fn token(claims: Value, secret: &[u8]) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn in_one_hour() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn valid_token_yields_user() {
        let validator = JwtSessionValidator::new(SECRET);
        let jwt = token(
            json!({"sub": "user-42", "exp": in_one_hour(), "email": "a@example.com", "name": "Ada"}),
            SECRET,
        );

        let user = validator.validate(&jwt).await.unwrap();

        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.label(), "Ada");
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let validator = JwtSessionValidator::new(SECRET);
        let jwt = token(
            json!({"sub": "user-42", "exp": in_one_hour()}),
            b"another-secret-that-is-32-bytes-long",
        );

        assert_eq!(validator.validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_token_is_reported_as_expired() {
        let validator = JwtSessionValidator::new(SECRET).with_leeway(0);
        let jwt = token(
            json!({"sub": "user-42", "exp": Utc::now().timestamp() - 3600}),
            SECRET,
        );

        assert_eq!(validator.validate(&jwt).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn empty_subject_is_invalid() {
        let validator = JwtSessionValidator::new(SECRET);
        let jwt = token(json!({"sub": "", "exp": in_one_hour()}), SECRET);

        assert_eq!(validator.validate(&jwt).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn issuer_and_audience_are_checked_when_configured() {
        let validator = JwtSessionValidator::new(SECRET)
            .with_issuer("https://id.example.com")
            .with_audience("finance-tracker");

        let good = token(
            json!({"sub": "u", "exp": in_one_hour(), "iss": "https://id.example.com", "aud": "finance-tracker"}),
            SECRET,
        );
        let wrong_aud = token(
            json!({"sub": "u", "exp": in_one_hour(), "iss": "https://id.example.com", "aud": "other"}),
            SECRET,
        );

        assert!(validator.validate(&good).await.is_ok());
        assert_eq!(
            validator.validate(&wrong_aud).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let validator = JwtSessionValidator::new(SECRET);
        assert_eq!(
            validator.validate("not-a-jwt").await,
            Err(AuthError::InvalidToken)
        );
    }
}
