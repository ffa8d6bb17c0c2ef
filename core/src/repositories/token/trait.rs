//! Revocation store trait: the single source of truth for whether an issued
//! token is still usable.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::token::IssuedToken;
use crate::errors::DomainError;

/// Result of an atomic refresh rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The presented token was live; it and its device siblings are now
    /// revoked and the replacements are recorded.
    Rotated,
    /// The presented token had already been revoked. Nothing was written.
    AlreadyRevoked,
    /// No record exists for the presented `jti`. Nothing was written.
    Unknown,
}

/// Repository trait for issued-token persistence and revocation
///
/// Every mutation only ever flips `revoked` from `false` to `true`, so all of
/// them are idempotent. Rows are never deleted through this trait.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Persist freshly minted tokens
    ///
    /// # Arguments
    /// * `tokens` - Rows to insert, all with `revoked == false`
    ///
    /// # Returns
    /// * `Ok(())` - Every row was stored
    /// * `Err(DomainError)` - Nothing was stored (duplicate `jti` included)
    async fn record(&self, tokens: &[IssuedToken]) -> Result<(), DomainError>;

    /// Look up the record for a `jti`
    ///
    /// # Returns
    /// * `Ok(Some(IssuedToken))` - Token is known
    /// * `Ok(None)` - Token was never recorded
    async fn find(&self, jti: &str) -> Result<Option<IssuedToken>, DomainError>;

    /// Whether a `jti` has been revoked. An unknown `jti` reports `false`;
    /// callers that must fail closed use [`RevocationStore::find`].
    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError>;

    /// Revoke a single token
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the flag
    /// * `Ok(false)` - Already revoked or unknown
    async fn revoke(&self, jti: &str) -> Result<bool, DomainError>;

    /// Revoke every live token of one device session
    ///
    /// # Returns
    /// * `Ok(count)` - Number of tokens this call revoked
    async fn revoke_all_for_device(
        &self,
        subject_id: Uuid,
        device_id: &str,
    ) -> Result<u64, DomainError>;

    /// Revoke every live token of a user across all devices
    ///
    /// # Returns
    /// * `Ok(count)` - Number of tokens this call revoked
    async fn revoke_all_for_subject(&self, subject_id: Uuid) -> Result<u64, DomainError>;

    /// Consume a refresh token and record its replacements as one atomic unit
    ///
    /// Conditionally revokes `presented_jti` only if it is still live. When
    /// that wins, the remaining tokens of `(subject_id, device_id)` are
    /// revoked and `replacements` recorded before the unit commits. Two
    /// concurrent calls for the same `jti` can never both return
    /// [`RotationOutcome::Rotated`].
    ///
    /// # Arguments
    /// * `presented_jti` - `jti` of the refresh token being exchanged
    /// * `subject_id` - Owner taken from the verified claims
    /// * `device_id` - Device session taken from the verified claims
    /// * `replacements` - Rows of the newly minted pair
    async fn rotate(
        &self,
        presented_jti: &str,
        subject_id: Uuid,
        device_id: &str,
        replacements: &[IssuedToken],
    ) -> Result<RotationOutcome, DomainError>;
}
