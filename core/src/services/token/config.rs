//! Configuration for the token codec and issuer

use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use kw_shared::config::auth::{DEVELOPMENT_SECRET, MAX_TOKEN_TTL_SECONDS};
use kw_shared::JwtConfig;

use crate::domain::entities::token::DEFAULT_ISSUER;
use crate::errors::DomainError;

/// Where signing material comes from
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Shared HMAC secret
    Secret(String),
    /// PEM files on disk, private key for signing and public key for verifying
    PemFiles {
        private_key_path: String,
        public_key_path: String,
    },
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Secret(_) => f.write_str("Secret(..)"),
            KeySource::PemFiles {
                private_key_path,
                public_key_path,
            } => f
                .debug_struct("PemFiles")
                .field("private_key_path", private_key_path)
                .field("public_key_path", public_key_path)
                .finish(),
        }
    }
}

/// Immutable token settings, built once at startup
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Value of the `iss` claim, also required on verification
    pub issuer: String,
    /// Signing algorithm, fixed for the lifetime of the codec
    pub algorithm: Algorithm,
    /// Signing material
    pub keys: KeySource,
    /// Access token lifetime
    pub access_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            algorithm: Algorithm::HS256,
            keys: KeySource::Secret(DEVELOPMENT_SECRET.to_string()),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(30),
        }
    }
}

impl TokenServiceConfig {
    /// HMAC configuration with the given secret and default lifetimes
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            keys: KeySource::Secret(secret.into()),
            ..Self::default()
        }
    }

    /// Translate the deployment settings into token settings
    pub fn from_jwt_config(jwt: &JwtConfig) -> Result<Self, DomainError> {
        let algorithm = Algorithm::from_str(&jwt.algorithm).map_err(|e| {
            DomainError::internal(format!(
                "Unsupported JWT algorithm '{}': {}",
                jwt.algorithm, e
            ))
        })?;

        let keys = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                KeySource::Secret(jwt.secret.clone())
            }
            _ => match (&jwt.private_key_path, &jwt.public_key_path) {
                (Some(private_key_path), Some(public_key_path)) => KeySource::PemFiles {
                    private_key_path: private_key_path.clone(),
                    public_key_path: public_key_path.clone(),
                },
                _ => {
                    return Err(DomainError::internal(format!(
                        "{:?} requires both a private and a public key path",
                        algorithm
                    )))
                }
            },
        };

        Ok(Self {
            issuer: jwt.issuer.clone(),
            algorithm,
            keys,
            access_ttl: ttl_from_seconds("access", jwt.access_token_ttl)?,
            refresh_ttl: ttl_from_seconds("refresh", jwt.refresh_token_ttl)?,
        })
    }
}

/// Positive lifetime no longer than [`MAX_TOKEN_TTL_SECONDS`]
fn ttl_from_seconds(kind: &str, seconds: i64) -> Result<Duration, DomainError> {
    if seconds <= 0 || seconds > MAX_TOKEN_TTL_SECONDS {
        return Err(DomainError::internal(format!(
            "{} token lifetime must be between 1 and {} seconds, got {}",
            kind, MAX_TOKEN_TTL_SECONDS, seconds
        )));
    }
    Duration::try_seconds(seconds)
        .ok_or_else(|| DomainError::internal(format!("{} token lifetime out of range", kind)))
}
