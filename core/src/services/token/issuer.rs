//! Minting and recording of token pairs

use std::sync::Arc;

use chrono::Duration;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::entities::token::{
    Claims, IssuedToken, MintedPair, MintedToken, TokenPair, TokenType,
};
use crate::errors::DomainError;
use crate::repositories::RevocationStore;

use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::ids::IdGenerator;

/// Builds claim sets, signs them and records every issued token
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    store: Arc<dyn RevocationStore>,
    ids: Arc<dyn IdGenerator>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(
        config: &TokenServiceConfig,
        codec: Arc<TokenCodec>,
        store: Arc<dyn RevocationStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            codec,
            store,
            ids,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Fresh identifier for a new login/device session
    pub fn new_device_id(&self) -> String {
        self.ids.new_id()
    }

    /// Fresh account id from the same generator as device ids and `jti`s
    ///
    /// # Returns
    ///
    /// `Internal` when the generator does not produce a UUID
    pub fn new_user_id(&self) -> Result<Uuid, DomainError> {
        let id = self.ids.new_id();
        Uuid::parse_str(&id).map_err(|e| {
            error!(id = %id, "Id generator produced a non-UUID user id");
            DomainError::internal(format!("Generated user id '{}' is not a UUID: {}", id, e))
        })
    }

    fn mint(
        &self,
        user_id: Uuid,
        device_id: &str,
        token_type: TokenType,
        ttl: Option<Duration>,
    ) -> Result<MintedToken, DomainError> {
        let claims = Claims::new(
            self.codec.issuer(),
            user_id,
            token_type,
            self.ids.new_id(),
            device_id,
            self.codec.clock().now(),
            ttl,
        );
        let token = self.codec.sign(&claims)?;
        let record = IssuedToken::from_claims(&claims, user_id)?;

        Ok(MintedToken {
            token,
            claims,
            record,
        })
    }

    /// Sign an access/refresh pair without persisting it
    pub fn mint_pair(&self, user_id: Uuid, device_id: &str) -> Result<MintedPair, DomainError> {
        Ok(MintedPair {
            access: self.mint(user_id, device_id, TokenType::Access, Some(self.access_ttl))?,
            refresh: self.mint(user_id, device_id, TokenType::Refresh, Some(self.refresh_ttl))?,
        })
    }

    /// Client-facing form of a minted pair
    pub fn to_token_pair(&self, minted: MintedPair) -> TokenPair {
        minted.into_token_pair(self.access_ttl, self.refresh_ttl)
    }

    /// Mint a pair and record both rows in one atomic write.
    ///
    /// Nothing is returned when persistence fails.
    pub async fn issue_pair(&self, user_id: Uuid, device_id: &str) -> Result<TokenPair, DomainError> {
        let minted = self.mint_pair(user_id, device_id)?;

        if let Err(e) = self.store.record(&minted.records()).await {
            error!(user_id = %user_id, device_id = %device_id, error = %e, "Failed to record issued tokens");
            return Err(e);
        }

        info!(
            user_id = %user_id,
            device_id = %device_id,
            access_jti = %minted.access.claims.jti,
            refresh_jti = %minted.refresh.claims.jti,
            "Issued token pair"
        );
        Ok(self.to_token_pair(minted))
    }

    /// Mint and record an access token with no expiry. It stays usable until revoked.
    pub async fn issue_unlimited_access(
        &self,
        user_id: Uuid,
        device_id: &str,
    ) -> Result<String, DomainError> {
        let minted = self.mint(user_id, device_id, TokenType::Access, None)?;
        self.store.record(std::slice::from_ref(&minted.record)).await?;

        info!(
            user_id = %user_id,
            device_id = %device_id,
            jti = %minted.claims.jti,
            "Issued unlimited access token"
        );
        Ok(minted.token)
    }
}
