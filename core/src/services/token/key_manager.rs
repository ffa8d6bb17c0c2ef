//! Signing and verification key material for every supported algorithm family

use std::fs;
use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::errors::DomainError;

use super::config::KeySource;

/// Key pair bound to one algorithm
#[derive(Clone)]
pub struct KeyManager {
    algorithm: Algorithm,
    /// Key for signing JWTs
    encoding_key: EncodingKey,
    /// Key for verifying JWTs
    decoding_key: DecodingKey,
    /// Files the keys were read from, `None` for secrets and in-memory PEM
    key_paths: Option<(PathBuf, PathBuf)>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("algorithm", &self.algorithm)
            .field("key_paths", &self.key_paths)
            .finish()
    }
}

fn key_error(what: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::internal(format!("{}: {}", what, e))
}

impl KeyManager {
    /// Load keys for `algorithm` from the configured source
    pub fn from_source(algorithm: Algorithm, source: &KeySource) -> Result<Self, DomainError> {
        match source {
            KeySource::Secret(secret) => Self::from_secret(algorithm, secret),
            KeySource::PemFiles {
                private_key_path,
                public_key_path,
            } => Self::from_pem_files(algorithm, private_key_path, public_key_path),
        }
    }

    /// HMAC keys from a shared secret
    pub fn from_secret(algorithm: Algorithm, secret: &str) -> Result<Self, DomainError> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::internal(format!(
                "{:?} cannot be used with a shared secret",
                algorithm
            )));
        }
        if secret.is_empty() {
            return Err(DomainError::internal("JWT secret must not be empty"));
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            key_paths: None,
        })
    }

    /// Asymmetric keys read from PEM files
    pub fn from_pem_files<P: AsRef<Path>>(
        algorithm: Algorithm,
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, DomainError> {
        let private_key_path = private_key_path.as_ref().to_path_buf();
        let public_key_path = public_key_path.as_ref().to_path_buf();

        let private_key_pem = fs::read(&private_key_path)
            .map_err(|e| key_error("Failed to read private key", e))?;
        let public_key_pem = fs::read(&public_key_path)
            .map_err(|e| key_error("Failed to read public key", e))?;

        let mut manager = Self::from_pem(algorithm, &private_key_pem, &public_key_pem)?;
        manager.key_paths = Some((private_key_path, public_key_path));
        Ok(manager)
    }

    /// Asymmetric keys from PEM bytes. RSA keys serve both RS* and PS*; EC
    /// private keys must be PKCS#8.
    pub fn from_pem(
        algorithm: Algorithm,
        private_key_pem: &[u8],
        public_key_pem: &[u8],
    ) -> Result<Self, DomainError> {
        let (encoding_key, decoding_key) = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => (
                EncodingKey::from_rsa_pem(private_key_pem)
                    .map_err(|e| key_error("Invalid RSA private key", e))?,
                DecodingKey::from_rsa_pem(public_key_pem)
                    .map_err(|e| key_error("Invalid RSA public key", e))?,
            ),
            Algorithm::ES256 | Algorithm::ES384 => (
                EncodingKey::from_ec_pem(private_key_pem)
                    .map_err(|e| key_error("Invalid EC private key", e))?,
                DecodingKey::from_ec_pem(public_key_pem)
                    .map_err(|e| key_error("Invalid EC public key", e))?,
            ),
            Algorithm::EdDSA => (
                EncodingKey::from_ed_pem(private_key_pem)
                    .map_err(|e| key_error("Invalid Ed25519 private key", e))?,
                DecodingKey::from_ed_pem(public_key_pem)
                    .map_err(|e| key_error("Invalid Ed25519 public key", e))?,
            ),
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                return Err(DomainError::internal(format!(
                    "{:?} uses a shared secret, not PEM keys",
                    algorithm
                )))
            }
        };

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            key_paths: None,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Returns the paths to the key files, if loaded from disk
    pub fn key_paths(&self) -> Option<(&Path, &Path)> {
        self.key_paths
            .as_ref()
            .map(|(private, public)| (private.as_path(), public.as_path()))
    }
}
