//! JWT signing and fail-closed verification

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use tracing::debug;

use crate::domain::entities::token::Claims;
use crate::errors::{AccessError, DomainError};

use super::clock::Clock;
use super::config::TokenServiceConfig;
use super::key_manager::KeyManager;

/// Stateless signer and verifier for one algorithm and issuer
pub struct TokenCodec {
    keys: KeyManager,
    issuer: String,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("keys", &self.keys)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec from loaded keys
    pub fn new(keys: KeyManager, issuer: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        let issuer = issuer.into();

        // Time claims are checked against the injected clock after decoding
        let mut validation = Validation::new(keys.algorithm());
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss"]);

        Self {
            keys,
            issuer,
            validation,
            clock,
        }
    }

    /// Loads keys described by the configuration
    pub fn from_config(
        config: &TokenServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let keys = KeyManager::from_source(config.algorithm, &config.keys)?;
        Ok(Self::new(keys, config.issuer.clone(), clock))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn algorithm(&self) -> Algorithm {
        self.keys.algorithm()
    }

    /// The clock verification is evaluated against
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Serialize and sign a claim set
    pub fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        encode(
            &Header::new(self.keys.algorithm()),
            claims,
            self.keys.encoding_key(),
        )
        .map_err(|e| DomainError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode and check a token. Every failure is reported as
    /// [`AccessError::InvalidSignatureOrExpired`].
    pub fn verify(&self, token: &str) -> Result<Claims, DomainError> {
        let claims = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| {
                debug!(reason = %e, "Token rejected by decoder");
                AccessError::InvalidSignatureOrExpired
            })?
            .claims;

        let now = self.clock.now();
        if !claims.is_valid_at(now) {
            debug!(jti = %claims.jti, "Token outside its validity window");
            return Err(AccessError::InvalidSignatureOrExpired.into());
        }

        Ok(claims)
    }
}
