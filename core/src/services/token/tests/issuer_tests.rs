//! Unit tests for token pair issuance

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{IssuedToken, TokenType};
use crate::errors::DomainError;
use crate::repositories::{InMemoryRevocationStore, RevocationStore, RotationOutcome};
use crate::services::token::{
    FixedClock, IdGenerator, TokenCodec, TokenIssuer, TokenServiceConfig, UuidGenerator,
};

fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Predictable ids: "id-1", "id-2", ...
#[derive(Default)]
struct SequentialIds(AtomicU64);

impl IdGenerator for SequentialIds {
    fn new_id(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Store whose writes always fail
struct UnavailableStore;

#[async_trait]
impl RevocationStore for UnavailableStore {
    async fn record(&self, _tokens: &[IssuedToken]) -> Result<(), DomainError> {
        Err(DomainError::unavailable("connection refused"))
    }

    async fn find(&self, _jti: &str) -> Result<Option<IssuedToken>, DomainError> {
        Ok(None)
    }

    async fn is_revoked(&self, _jti: &str) -> Result<bool, DomainError> {
        Ok(false)
    }

    async fn revoke(&self, _jti: &str) -> Result<bool, DomainError> {
        Err(DomainError::unavailable("connection refused"))
    }

    async fn revoke_all_for_device(
        &self,
        _subject_id: Uuid,
        _device_id: &str,
    ) -> Result<u64, DomainError> {
        Err(DomainError::unavailable("connection refused"))
    }

    async fn revoke_all_for_subject(&self, _subject_id: Uuid) -> Result<u64, DomainError> {
        Err(DomainError::unavailable("connection refused"))
    }

    async fn rotate(
        &self,
        _presented_jti: &str,
        _subject_id: Uuid,
        _device_id: &str,
        _replacements: &[IssuedToken],
    ) -> Result<RotationOutcome, DomainError> {
        Err(DomainError::unavailable("connection refused"))
    }
}

struct Fixture {
    issuer: TokenIssuer,
    store: Arc<InMemoryRevocationStore>,
    clock: Arc<FixedClock>,
}

fn fixture_with_ids(ids: Arc<dyn IdGenerator>) -> Fixture {
    let config = TokenServiceConfig::with_secret("issuer-test-secret");
    let clock = Arc::new(FixedClock::new(start()));
    let codec = Arc::new(TokenCodec::from_config(&config, clock.clone()).unwrap());
    let store = Arc::new(InMemoryRevocationStore::new());
    let issuer = TokenIssuer::new(&config, codec, store.clone(), ids);
    Fixture {
        issuer,
        store,
        clock,
    }
}

fn fixture() -> Fixture {
    fixture_with_ids(Arc::new(UuidGenerator))
}

#[tokio::test]
async fn test_issue_pair_records_both_tokens() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let device_id = f.issuer.new_device_id();

    let pair = f.issuer.issue_pair(user_id, &device_id).await.unwrap();

    let codec = f.issuer.codec();
    let access = codec.verify(&pair.access_token).unwrap();
    let refresh = codec.verify(&pair.refresh_token).unwrap();

    assert_eq!(access.token_type, TokenType::Access);
    assert_eq!(refresh.token_type, TokenType::Refresh);
    assert_ne!(access.jti, refresh.jti);
    assert_eq!(access.device_id, device_id);
    assert_eq!(refresh.device_id, device_id);
    assert_eq!(pair.device_id, device_id);
    assert_eq!(access.sub, user_id.to_string());
    assert_eq!(access.exp, Some(start().timestamp() + 900));
    assert_eq!(refresh.exp, Some(start().timestamp() + 30 * 86400));
    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 30 * 86400);

    let access_row = f.store.find(&access.jti).await.unwrap().unwrap();
    assert!(!access_row.revoked);
    assert_eq!(access_row.subject_id, user_id);
    assert_eq!(access_row.token_type, TokenType::Access);
    assert_eq!(access_row.expires_at, Some(start() + Duration::minutes(15)));

    let refresh_row = f.store.find(&refresh.jti).await.unwrap().unwrap();
    assert_eq!(refresh_row.token_type, TokenType::Refresh);
    assert_eq!(refresh_row.device_id, device_id);
}

#[tokio::test]
async fn test_ids_come_from_generator() {
    let f = fixture_with_ids(Arc::new(SequentialIds::default()));
    let device_id = f.issuer.new_device_id();
    assert_eq!(device_id, "id-1");

    let pair = f
        .issuer
        .issue_pair(Uuid::new_v4(), &device_id)
        .await
        .unwrap();
    let codec = f.issuer.codec();
    assert_eq!(codec.verify(&pair.access_token).unwrap().jti, "id-2");
    assert_eq!(codec.verify(&pair.refresh_token).unwrap().jti, "id-3");
}

#[tokio::test]
async fn test_persistence_failure_returns_no_tokens() {
    let config = TokenServiceConfig::with_secret("issuer-test-secret");
    let clock = Arc::new(FixedClock::new(start()));
    let codec = Arc::new(TokenCodec::from_config(&config, clock).unwrap());
    let issuer = TokenIssuer::new(
        &config,
        codec,
        Arc::new(UnavailableStore),
        Arc::new(UuidGenerator),
    );

    let result = issuer.issue_pair(Uuid::new_v4(), "device-1").await;
    assert!(matches!(result, Err(DomainError::Unavailable { .. })));
}

#[tokio::test]
async fn test_mint_pair_does_not_persist() {
    let f = fixture();
    let minted = f.issuer.mint_pair(Uuid::new_v4(), "device-1").unwrap();

    assert!(f.store.is_empty().await);
    let [access, refresh] = minted.records();
    assert_eq!(access.token_type, TokenType::Access);
    assert_eq!(refresh.token_type, TokenType::Refresh);
    assert_eq!(access.device_id, refresh.device_id);

    let pair = f.issuer.to_token_pair(minted);
    assert_eq!(pair.device_id, "device-1");
}

#[tokio::test]
async fn test_unlimited_access_token() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let token = f
        .issuer
        .issue_unlimited_access(user_id, "device-1")
        .await
        .unwrap();

    f.clock.advance(Duration::days(3650));
    let claims = f.issuer.codec().verify(&token).unwrap();
    assert_eq!(claims.exp, None);
    assert_eq!(claims.token_type, TokenType::Access);

    let row = f.store.find(&claims.jti).await.unwrap().unwrap();
    assert_eq!(row.expires_at, None);
    assert!(!row.revoked);

    assert!(f.store.revoke(&claims.jti).await.unwrap());
}

#[tokio::test]
async fn test_issued_tokens_expire_with_clock() {
    let f = fixture();
    let pair = f
        .issuer
        .issue_pair(Uuid::new_v4(), "device-1")
        .await
        .unwrap();

    f.clock.advance(Duration::minutes(15));
    assert!(f.issuer.codec().verify(&pair.access_token).is_err());
    assert!(f.issuer.codec().verify(&pair.refresh_token).is_ok());
}

#[tokio::test]
async fn test_unrepresentable_expiry_is_not_recorded_as_unlimited() {
    let mut config = TokenServiceConfig::with_secret("issuer-test-secret");
    config.refresh_ttl = Duration::seconds(10_000_000_000_000);
    let clock = Arc::new(FixedClock::new(start()));
    let codec = Arc::new(TokenCodec::from_config(&config, clock).unwrap());
    let store = Arc::new(InMemoryRevocationStore::new());
    let issuer = TokenIssuer::new(&config, codec, store.clone(), Arc::new(UuidGenerator));

    let result = issuer.issue_pair(Uuid::new_v4(), "device-1").await;

    assert!(matches!(result, Err(DomainError::Internal { .. })));
    assert!(store.is_empty().await);
}

#[test]
fn test_user_ids_must_be_uuids() {
    let f = fixture();
    let first = f.issuer.new_user_id().unwrap();
    let second = f.issuer.new_user_id().unwrap();
    assert_ne!(first, second);

    let f = fixture_with_ids(Arc::new(SequentialIds::default()));
    assert!(matches!(
        f.issuer.new_user_id(),
        Err(DomainError::Internal { .. })
    ));
}
