//! Password hashing seam

use async_trait::async_trait;

use crate::errors::DomainError;

/// Hashes new passwords and checks presented ones.
///
/// Implementations may be CPU-heavy and are expected to keep that work off
/// the async executor.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// `Ok(false)` for a wrong password; `Err` only when checking itself failed
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
