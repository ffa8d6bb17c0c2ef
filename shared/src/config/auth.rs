//! Authentication configuration: token signing and session policy

use config::ConfigError;
use serde::{Deserialize, Serialize};

/// Secret used when nothing else is configured. Refused in production.
pub const DEVELOPMENT_SECRET: &str = "development-secret-please-change-in-production";

/// Longest accepted token lifetime in seconds (10 years)
pub const MAX_TOKEN_TTL_SECONDS: i64 = 10 * 365 * 86400;

/// Algorithms accepted for token signing
pub const SUPPORTED_ALGORITHMS: &[&str] = &[
    "HS256", "HS384", "HS512", "RS256", "RS384", "RS512", "PS256", "PS384", "PS512", "ES256",
    "ES384", "EdDSA",
];

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared secret for HMAC algorithms
    pub secret: String,

    /// Signing algorithm, fixed per deployment
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Value of the `iss` claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Access token lifetime in seconds
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,

    /// PEM private key for asymmetric algorithms
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key for asymmetric algorithms
    #[serde(default)]
    pub public_key_path: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEVELOPMENT_SECRET),
            algorithm: default_algorithm(),
            issuer: default_issuer(),
            access_token_ttl: 900,      // 15 minutes
            refresh_token_ttl: 2592000, // 30 days
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl = minutes * 60;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl = days * 86400;
        self
    }

    /// Switch to an asymmetric algorithm backed by PEM key files
    pub fn with_key_files(
        mut self,
        algorithm: impl Into<String>,
        private_key_path: impl Into<String>,
        public_key_path: impl Into<String>,
    ) -> Self {
        self.algorithm = algorithm.into();
        self.private_key_path = Some(private_key_path.into());
        self.public_key_path = Some(public_key_path.into());
        self
    }

    /// Whether the configured algorithm uses a shared secret
    pub fn is_symmetric(&self) -> bool {
        self.algorithm.starts_with("HS")
    }

    /// Check if using the development secret
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }

    /// Read from `JWT_*` environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_token_ttl: std::env::var("JWT_ACCESS_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.access_token_ttl),
            refresh_token_ttl: std::env::var("JWT_REFRESH_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_token_ttl),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }

    /// Reject configurations that cannot sign or would weaken tokens
    pub fn validate(&self, production: bool) -> Result<(), ConfigError> {
        if !SUPPORTED_ALGORITHMS.contains(&self.algorithm.as_str()) {
            return Err(ConfigError::Message(format!(
                "unsupported JWT algorithm: {}",
                self.algorithm
            )));
        }
        if self.is_symmetric() {
            if self.secret.is_empty() {
                return Err(ConfigError::Message("JWT secret must not be empty".into()));
            }
            if production && self.is_using_default_secret() {
                return Err(ConfigError::Message(
                    "the development JWT secret cannot be used in production".into(),
                ));
            }
        } else if self.private_key_path.is_none() || self.public_key_path.is_none() {
            return Err(ConfigError::Message(format!(
                "{} requires both a private and a public key path",
                self.algorithm
            )));
        }
        if self.access_token_ttl <= 0 || self.refresh_token_ttl <= 0 {
            return Err(ConfigError::Message("token TTLs must be positive".into()));
        }
        if self.access_token_ttl > MAX_TOKEN_TTL_SECONDS
            || self.refresh_token_ttl > MAX_TOKEN_TTL_SECONDS
        {
            return Err(ConfigError::Message(format!(
                "token TTLs must not exceed {} seconds",
                MAX_TOKEN_TTL_SECONDS
            )));
        }
        if self.refresh_token_ttl < self.access_token_ttl {
            return Err(ConfigError::Message(
                "refresh token TTL must not be shorter than the access token TTL".into(),
            ));
        }
        Ok(())
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Session policy
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            session: SessionConfig::from_env(),
        }
    }
}

/// Session policy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Whether new accounts may register
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_registration: default_allow_registration(),
        }
    }
}

impl SessionConfig {
    /// Read `ALLOW_REGISTRATION`, defaulting to enabled
    pub fn from_env() -> Self {
        Self {
            allow_registration: std::env::var("ALLOW_REGISTRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_allow_registration),
        }
    }
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_issuer() -> String {
    String::from("keyward@auth_service")
}

fn default_allow_registration() -> bool {
    true
}
