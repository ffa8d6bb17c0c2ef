//! bcrypt-backed password hashing

use async_trait::async_trait;

use kw_core::errors::DomainError;
use kw_core::services::session::PasswordHasher;

/// [`PasswordHasher`] using bcrypt on tokio's blocking pool
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with an explicit work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| {
                DomainError::internal(format!("Password verification task failed: {}", e))
            })?;

        match result {
            Ok(matches) => Ok(matches),
            // A corrupt stored hash must not let anyone in
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(4)
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hasher().hash("correct horse").await.unwrap();

        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "correct horse");
        assert!(hasher().verify("correct horse", &hash).await.unwrap());
        assert!(!hasher().verify("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hasher().hash("same").await.unwrap();
        let second = hasher().hash("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_garbage_hash_never_matches() {
        assert!(!hasher().verify("anything", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_cost_is_internal_error() {
        let err = tokio_test::assert_err!(BcryptPasswordHasher::new(2).hash("pw").await);
        assert!(matches!(err, DomainError::Internal { .. }));
    }

    #[test]
    fn test_hasher_on_current_thread_runtime() {
        let hash = tokio_test::block_on(hasher().hash("single thread"));
        let hash = tokio_test::assert_ok!(hash);

        let matched = tokio_test::block_on(hasher().verify("single thread", &hash));
        assert!(tokio_test::assert_ok!(matched));
    }
}
