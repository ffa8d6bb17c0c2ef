//! # Infrastructure Layer
//!
//! Concrete backends for the Keyward core:
//! - **Database**: MySQL revocation store and user repository using SQLx,
//!   connection pool and embedded migrations
//! - **Password**: bcrypt hashing off the async executor
//! - **Telemetry**: `tracing-subscriber` setup from [`LoggingConfig`]
//!
//! [`initialize`] loads configuration and wires every service together.
//!
//! [`LoggingConfig`]: kw_shared::LoggingConfig

use std::sync::Arc;

use kw_core::errors::DomainError;
use kw_core::repositories::{RevocationStore, UserRepository};
use kw_core::services::guard::AccessGuard;
use kw_core::services::session::{SessionService, SessionServiceConfig};
use kw_core::services::token::{
    SystemClock, TokenCodec, TokenIssuer, TokenServiceConfig, UuidGenerator,
};
use kw_shared::AppConfig;

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Password hashing
pub mod password;

/// Tracing subscriber setup
pub mod telemetry;

pub use database::{DatabasePool, MySqlRevocationStore, MySqlUserRepository};
pub use password::BcryptPasswordHasher;
pub use telemetry::init_tracing;

/// Fully wired services sharing one pool and one revocation store
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Database connection pool
    pub pool: DatabasePool,
    /// Issued-token records
    pub store: Arc<dyn RevocationStore>,
    /// User accounts
    pub users: Arc<dyn UserRepository>,
    /// Token signing and verification
    pub codec: Arc<TokenCodec>,
    /// Pair minting
    pub issuer: Arc<TokenIssuer>,
    /// Per-request access checks
    pub guard: Arc<AccessGuard>,
    /// Register, login, logout and refresh
    pub sessions: Arc<SessionService>,
}

impl InfrastructureServices {
    /// Wire the core services over an existing pool
    ///
    /// # Arguments
    /// * `pool` - Connected database pool
    /// * `config` - Validated application configuration
    pub fn from_pool(pool: DatabasePool, config: &AppConfig) -> Result<Self, InfrastructureError> {
        let token_config = TokenServiceConfig::from_jwt_config(&config.auth.jwt)?;
        let codec = Arc::new(TokenCodec::from_config(
            &token_config,
            Arc::new(SystemClock),
        )?);

        let store: Arc<dyn RevocationStore> =
            Arc::new(MySqlRevocationStore::new(pool.get_pool().clone()));
        let users: Arc<dyn UserRepository> =
            Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));

        let issuer = Arc::new(TokenIssuer::new(
            &token_config,
            codec.clone(),
            store.clone(),
            Arc::new(UuidGenerator),
        ));
        let guard = Arc::new(AccessGuard::new(
            codec.clone(),
            store.clone(),
            users.clone(),
        ));
        let sessions = Arc::new(SessionService::new(
            users.clone(),
            store.clone(),
            issuer.clone(),
            Arc::new(BcryptPasswordHasher::default()),
            SessionServiceConfig::from(&config.auth.session),
        ));

        Ok(Self {
            pool,
            store,
            users,
            codec,
            issuer,
            guard,
            sessions,
        })
    }
}

/// Initialize infrastructure services
///
/// This function:
/// - Loads `.env` and the layered configuration
/// - Creates the database pool and applies pending migrations
/// - Builds the codec, issuer, access guard and session service
///
/// Tracing is left to the caller; see [`init_tracing`].
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config()?;
    initialize_with(&config).await
}

/// [`initialize`] with an already loaded configuration
pub async fn initialize_with(
    config: &AppConfig,
) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(environment = %config.environment, "Initializing infrastructure services");

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.run_migrations().await?;
    let services = InfrastructureServices::from_pool(pool, config)?;

    tracing::info!(
        algorithm = ?services.codec.algorithm(),
        issuer = services.codec.issuer(),
        "Infrastructure services initialized"
    );
    Ok(services)
}

/// Load configuration: `.env` if present, then [`AppConfig::load`]
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    dotenvy::dotenv().ok();
    AppConfig::load().map_err(|e| InfrastructureError::Config(e.to_string()))
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Core service could not be built, e.g. unreadable signing keys
    #[error("Service setup error: {0}")]
    Domain(#[from] DomainError),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
