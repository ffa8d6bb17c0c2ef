//! Per-request access token verification

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::token::{Claims, TokenType};
use crate::domain::entities::user::User;
use crate::domain::value_objects::Principal;
use crate::errors::{AccessError, DomainError};
use crate::repositories::{RevocationStore, UserRepository};
use crate::services::token::TokenCodec;

use super::credentials::{extract_bearer_token, select_credential};

/// Verifies access credentials and resolves their owner. Never mutates state.
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
    store: Arc<dyn RevocationStore>,
    users: Arc<dyn UserRepository>,
}

impl AccessGuard {
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn RevocationStore>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            codec,
            store,
            users,
        }
    }

    /// Authenticate a `Bearer <token>` credential
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<Principal, DomainError> {
        let token = extract_bearer_token(credential).map_err(|kind| {
            debug!(code = kind.code(), "Credential rejected");
            kind
        })?;

        let claims = self.codec.verify(token)?;

        if claims.token_type != TokenType::Access {
            debug!(jti = %claims.jti, token_type = %claims.token_type, "Non-access token presented");
            return Err(AccessError::WrongTokenType.into());
        }

        self.ensure_live(&claims).await?;
        let user = self.resolve_owner(&claims).await?;

        Ok(Principal {
            user,
            device_id: claims.device_id,
            jti: claims.jti,
        })
    }

    /// Authenticate using the `Authorization` header, falling back to the
    /// credential cookie when the header is absent or blank
    pub async fn authenticate_request(
        &self,
        header: Option<&str>,
        cookie: Option<&str>,
    ) -> Result<Principal, DomainError> {
        self.authenticate(select_credential(header, cookie)).await
    }

    /// Fails closed: a revoked, unknown or foreign `jti` is reported as revoked
    async fn ensure_live(&self, claims: &Claims) -> Result<(), DomainError> {
        match self.store.find(&claims.jti).await? {
            Some(record) if record.revoked => {
                debug!(jti = %claims.jti, "Revoked token presented");
                Err(AccessError::TokenRevoked.into())
            }
            Some(record) if claims.user_id().ok() != Some(record.subject_id) => {
                warn!(
                    jti = %claims.jti,
                    recorded_subject = %record.subject_id,
                    "Token subject does not match its record"
                );
                Err(AccessError::TokenRevoked.into())
            }
            Some(_) => Ok(()),
            None => {
                warn!(jti = %claims.jti, "Validly signed token has no record");
                Err(AccessError::TokenRevoked.into())
            }
        }
    }

    async fn resolve_owner(&self, claims: &Claims) -> Result<User, DomainError> {
        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::from(AccessError::OwnerNotFound))?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %user_id, "Token owner no longer exists");
                AccessError::OwnerNotFound.into()
            })
    }
}
