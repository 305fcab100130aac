//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum HS256 secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Session token verification settings (HS256 JWT).
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret used to verify session tokens
    pub jwt_secret: SecretString,

    /// Expected `iss` claim, if tokens carry one
    pub jwt_issuer: Option<String>,

    /// Expected `aud` claim, if tokens carry one
    pub jwt_audience: Option<String>,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_leeway")]
    pub jwt_leeway_secs: u64,
}

impl AuthConfig {
    /// Creates a config with the given secret and default claim checks.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: SecretString::new(secret.into()),
            jwt_issuer: None,
            jwt_audience: None,
            jwt_leeway_secs: default_leeway(),
        }
    }

    /// Validate authentication configuration
    ///
    /// The secret is always required. In production it must also be long
    /// enough to resist brute force.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_BYTES {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_BYTES));
        }
        Ok(())
    }
}

fn default_leeway() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::with_secret("dev-secret");
        assert_eq!(config.jwt_leeway_secs, 30);
        assert!(config.jwt_issuer.is_none());
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = AuthConfig::with_secret("");
        assert_eq!(
            config.validate(&Environment::Development),
            Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"))
        );
    }

    #[test]
    fn test_validation_production_requires_long_secret() {
        let config = AuthConfig::with_secret("short-dev-secret");
        // Allowed in development
        assert!(config.validate(&Environment::Development).is_ok());
        // Rejected in production
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::JwtSecretTooShort(32))
        );
    }

    #[test]
    fn test_validation_valid_production_config() {
        let config = AuthConfig::with_secret("x".repeat(MIN_PRODUCTION_SECRET_BYTES));
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = AuthConfig::with_secret("super-secret-value");
        assert!(!format!("{:?}", config).contains("super-secret-value"));
    }
}
