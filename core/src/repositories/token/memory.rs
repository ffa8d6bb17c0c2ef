//! In-memory implementation of RevocationStore

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::IssuedToken;
use crate::errors::DomainError;

use super::trait_::{RevocationStore, RotationOutcome};

/// Revocation store backed by a map behind one lock.
///
/// Every mutating operation holds the write lock for its whole duration,
/// which is what makes [`RevocationStore::rotate`] atomic here.
#[derive(Clone)]
pub struct InMemoryRevocationStore {
    tokens: Arc<RwLock<HashMap<String, IssuedToken>>>,
}

impl InMemoryRevocationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether no row has been stored yet
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// All rows of one subject
    pub async fn tokens_for_subject(&self, subject_id: Uuid) -> Vec<IssuedToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.subject_id == subject_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

fn check_insertable(
    tokens: &HashMap<String, IssuedToken>,
    batch: &[IssuedToken],
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for token in batch {
        if tokens.contains_key(&token.jti) || !seen.insert(token.jti.as_str()) {
            return Err(DomainError::internal(format!(
                "Duplicate token id: {}",
                token.jti
            )));
        }
    }
    Ok(())
}

fn insert_all(tokens: &mut HashMap<String, IssuedToken>, batch: &[IssuedToken]) {
    for token in batch {
        tokens.insert(token.jti.clone(), token.clone());
    }
}

fn revoke_matching(
    tokens: &mut HashMap<String, IssuedToken>,
    predicate: impl Fn(&IssuedToken) -> bool,
) -> u64 {
    let mut count = 0;
    for token in tokens.values_mut() {
        if !token.revoked && predicate(token) {
            token.revoke();
            count += 1;
        }
    }
    count
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn record(&self, batch: &[IssuedToken]) -> Result<(), DomainError> {
        let mut tokens = self.tokens.write().await;
        check_insertable(&tokens, batch)?;
        insert_all(&mut tokens, batch);
        Ok(())
    }

    async fn find(&self, jti: &str) -> Result<Option<IssuedToken>, DomainError> {
        Ok(self.tokens.read().await.get(jti).cloned())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self
            .tokens
            .read()
            .await
            .get(jti)
            .is_some_and(|t| t.revoked))
    }

    async fn revoke(&self, jti: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(jti) {
            Some(token) if !token.revoked => {
                token.revoke();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_device(
        &self,
        subject_id: Uuid,
        device_id: &str,
    ) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_matching(&mut tokens, |t| {
            t.subject_id == subject_id && t.device_id == device_id
        }))
    }

    async fn revoke_all_for_subject(&self, subject_id: Uuid) -> Result<u64, DomainError> {
        let mut tokens = self.tokens.write().await;
        Ok(revoke_matching(&mut tokens, |t| t.subject_id == subject_id))
    }

    async fn rotate(
        &self,
        presented_jti: &str,
        subject_id: Uuid,
        device_id: &str,
        replacements: &[IssuedToken],
    ) -> Result<RotationOutcome, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get(presented_jti) {
            None => return Ok(RotationOutcome::Unknown),
            Some(token) if token.revoked => return Ok(RotationOutcome::AlreadyRevoked),
            Some(_) => {}
        }

        // Reject bad replacements before any flag changes
        check_insertable(&tokens, replacements)?;

        revoke_matching(&mut tokens, |t| {
            t.jti == presented_jti || (t.subject_id == subject_id && t.device_id == device_id)
        });
        insert_all(&mut tokens, replacements);

        Ok(RotationOutcome::Rotated)
    }
}
