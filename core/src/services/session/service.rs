//! Session use cases: register, login, logout and refresh rotation

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::token::{TokenPair, TokenType};
use crate::domain::entities::user::User;
use crate::domain::value_objects::{AuthSession, Principal};
use crate::errors::{AccessError, AuthError, DomainError, DomainResult};
use crate::repositories::{RevocationStore, RotationOutcome, UserRepository};
use crate::services::token::TokenIssuer;

use super::config::SessionServiceConfig;
use super::password::PasswordHasher;
use super::requests::{LoginRequest, RegisterRequest};

/// Orchestrates account and session lifecycles on top of the token issuer
pub struct SessionService {
    /// User repository for account lookups and creation
    users: Arc<dyn UserRepository>,
    /// Revocation store shared with the issuer and the access guard
    store: Arc<dyn RevocationStore>,
    /// Token issuer for minting pairs
    issuer: Arc<TokenIssuer>,
    /// Password hasher
    hasher: Arc<dyn PasswordHasher>,
    /// Service configuration
    config: SessionServiceConfig,
}

impl SessionService {
    /// Create a new session service
    ///
    /// # Arguments
    ///
    /// * `users` - Repository for user data persistence
    /// * `store` - Revocation store the issuer records into
    /// * `issuer` - Token issuer
    /// * `hasher` - Password hasher
    /// * `config` - Service configuration
    pub fn new(
        users: Arc<dyn UserRepository>,
        store: Arc<dyn RevocationStore>,
        issuer: Arc<TokenIssuer>,
        hasher: Arc<dyn PasswordHasher>,
        config: SessionServiceConfig,
    ) -> Self {
        Self {
            users,
            store,
            issuer,
            hasher,
            config,
        }
    }

    /// Create an account and open its first session
    ///
    /// This method:
    /// 1. Rejects the call when registration is disabled
    /// 2. Validates email shape, password and display name lengths
    /// 3. Rejects an email that is already registered
    /// 4. Hashes the password and stores the user under a generated id
    /// 5. Issues a token pair for a fresh device id
    pub async fn register(&self, request: RegisterRequest) -> DomainResult<AuthSession> {
        if !self.config.allow_registration {
            return Err(AuthError::RegistrationDisabled.into());
        }

        let request = request.normalized();
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            info!("Registration rejected, email already registered");
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let now = self.issuer.codec().clock().now();
        let user_id = self.issuer.new_user_id()?;
        let user = self
            .users
            .create(User::new(
                user_id,
                &request.email,
                password_hash,
                &request.display_name,
                now,
            ))
            .await?;

        let tokens = self.open_session(&user).await?;
        info!(user_id = %user.id, device_id = %tokens.device_id, "User registered");

        Ok(AuthSession { user, tokens })
    }

    /// Authenticate with email and password and open a new device session.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> DomainResult<AuthSession> {
        let Some(user) = self.users.find_by_email(&request.email).await? else {
            info!("Login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await?
        {
            info!(user_id = %user.id, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.open_session(&user).await?;
        info!(user_id = %user.id, device_id = %tokens.device_id, "User logged in");

        Ok(AuthSession { user, tokens })
    }

    /// Revoke every token of the principal's device session
    ///
    /// # Returns
    ///
    /// Number of tokens revoked by this call
    pub async fn logout(&self, principal: &Principal) -> DomainResult<u64> {
        let revoked = self
            .store
            .revoke_all_for_device(principal.user.id, &principal.device_id)
            .await?;

        info!(
            user_id = %principal.user.id,
            device_id = %principal.device_id,
            revoked,
            "Logged out device"
        );
        Ok(revoked)
    }

    /// Revoke every token of the principal across all devices
    pub async fn logout_everywhere(&self, principal: &Principal) -> DomainResult<u64> {
        let revoked = self
            .store
            .revoke_all_for_subject(principal.user.id)
            .await?;

        info!(user_id = %principal.user.id, revoked, "Logged out everywhere");
        Ok(revoked)
    }

    /// Exchange a refresh token for a new pair on the same device
    ///
    /// The presented token is consumed atomically. Presenting it again is
    /// treated as theft: every token of the user is revoked and the call
    /// fails with [`AccessError::TokenReplayDetected`].
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.issuer.codec().verify(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AccessError::WrongTokenType.into());
        }

        let user_id = self.resolve_owner(&claims.sub).await?;
        let minted = self.issuer.mint_pair(user_id, &claims.device_id)?;

        let outcome = self
            .store
            .rotate(&claims.jti, user_id, &claims.device_id, &minted.records())
            .await?;

        match outcome {
            RotationOutcome::Rotated => {
                info!(
                    user_id = %user_id,
                    device_id = %claims.device_id,
                    consumed_jti = %claims.jti,
                    access_jti = %minted.access.claims.jti,
                    refresh_jti = %minted.refresh.claims.jti,
                    "Rotated refresh token"
                );
                Ok(self.issuer.to_token_pair(minted))
            }
            RotationOutcome::AlreadyRevoked => {
                let revoked = self.store.revoke_all_for_subject(user_id).await?;
                warn!(
                    user_id = %user_id,
                    device_id = %claims.device_id,
                    jti = %claims.jti,
                    revoked,
                    "Refresh token replay detected, revoked all tokens of the user"
                );
                Err(AccessError::TokenReplayDetected.into())
            }
            RotationOutcome::Unknown => {
                error!(
                    user_id = %user_id,
                    jti = %claims.jti,
                    "Validly signed refresh token has no record"
                );
                Err(AccessError::TokenRevoked.into())
            }
        }
    }

    async fn open_session(&self, user: &User) -> DomainResult<TokenPair> {
        let device_id = self.issuer.new_device_id();
        self.issuer.issue_pair(user.id, &device_id).await
    }

    async fn resolve_owner(&self, subject: &str) -> DomainResult<Uuid> {
        let user_id =
            Uuid::parse_str(subject).map_err(|_| DomainError::from(AccessError::OwnerNotFound))?;

        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.id),
            None => Err(AccessError::OwnerNotFound.into()),
        }
    }
}
