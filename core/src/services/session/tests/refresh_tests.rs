//! Tests for refresh rotation and replay detection

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, TokenType};
use crate::domain::entities::user::User;
use crate::errors::{AccessError, DomainError};
use crate::repositories::RevocationStore;

use super::mocks::{start, Harness};

fn kind<T: std::fmt::Debug>(result: Result<T, DomainError>) -> Option<AccessError> {
    result.unwrap_err().access_kind()
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let h = Harness::new();
    let session = h.register("rotate@example.com").await;
    let codec = h.issuer.codec();
    let old_access = codec.verify(&session.tokens.access_token).unwrap();
    let old_refresh = codec.verify(&session.tokens.refresh_token).unwrap();

    let pair = h.sessions.refresh(&session.tokens.refresh_token).await.unwrap();

    let new_access = codec.verify(&pair.access_token).unwrap();
    let new_refresh = codec.verify(&pair.refresh_token).unwrap();
    assert_eq!(pair.device_id, session.tokens.device_id);
    assert_eq!(new_access.device_id, session.tokens.device_id);
    assert_eq!(new_refresh.device_id, session.tokens.device_id);
    assert_ne!(new_access.jti, new_refresh.jti);
    assert_ne!(new_access.jti, old_access.jti);
    assert_ne!(new_refresh.jti, old_refresh.jti);

    assert!(h.store.is_revoked(&old_access.jti).await.unwrap());
    assert!(h.store.is_revoked(&old_refresh.jti).await.unwrap());

    // the old access token dies with the rotation
    assert_eq!(
        kind(h.authenticate(&session.tokens.access_token).await),
        Some(AccessError::TokenRevoked)
    );
    let principal = h.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(principal.user.id, session.user.id);
}

#[tokio::test]
async fn test_refresh_chain() {
    let h = Harness::new();
    let session = h.register("chain@example.com").await;

    let mut refresh_token = session.tokens.refresh_token.clone();
    for _ in 0..5 {
        let pair = h.sessions.refresh(&refresh_token).await.unwrap();
        assert!(h.authenticate(&pair.access_token).await.is_ok());
        refresh_token = pair.refresh_token;
    }

    let live: Vec<_> = h
        .store
        .tokens_for_subject(session.user.id)
        .await
        .into_iter()
        .filter(|t| !t.revoked)
        .collect();
    assert_eq!(live.len(), 2);
}

#[tokio::test]
async fn test_replay_revokes_every_device() {
    let h = Harness::new();
    let phone = h.register("replay@example.com").await;
    let laptop = h.login("replay@example.com").await;

    let rotated = h.sessions.refresh(&phone.tokens.refresh_token).await.unwrap();

    assert_eq!(
        kind(h.sessions.refresh(&phone.tokens.refresh_token).await),
        Some(AccessError::TokenReplayDetected)
    );

    let rows = h.store.tokens_for_subject(phone.user.id).await;
    assert!(rows.iter().all(|t| t.revoked));
    for token in [&rotated.access_token, &laptop.tokens.access_token] {
        assert_eq!(
            kind(h.authenticate(token).await),
            Some(AccessError::TokenRevoked)
        );
    }

    // the successor refresh token is dead too
    assert_eq!(
        kind(h.sessions.refresh(&rotated.refresh_token).await),
        Some(AccessError::TokenReplayDetected)
    );
}

#[tokio::test]
async fn test_replay_leaves_other_users_alone() {
    let h = Harness::new();
    let victim = h.register("victim@example.com").await;
    let bystander = h.register("bystander@example.com").await;

    h.sessions.refresh(&victim.tokens.refresh_token).await.unwrap();
    let _ = h.sessions.refresh(&victim.tokens.refresh_token).await;

    assert!(h.authenticate(&bystander.tokens.access_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_with_access_token() {
    let h = Harness::new();
    let session = h.register("wrongtype@example.com").await;

    assert_eq!(
        kind(h.sessions.refresh(&session.tokens.access_token).await),
        Some(AccessError::WrongTokenType)
    );
    // nothing was consumed
    assert!(h.sessions.refresh(&session.tokens.refresh_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_expired_token() {
    let h = Harness::new();
    let session = h.register("expired@example.com").await;

    h.clock.advance(Duration::days(30));

    assert_eq!(
        kind(h.sessions.refresh(&session.tokens.refresh_token).await),
        Some(AccessError::InvalidSignatureOrExpired)
    );
    assert_eq!(
        kind(h.authenticate(&session.tokens.access_token).await),
        Some(AccessError::InvalidSignatureOrExpired)
    );
}

#[tokio::test]
async fn test_refresh_garbage() {
    let h = Harness::new();
    assert_eq!(
        kind(h.sessions.refresh("garbage").await),
        Some(AccessError::InvalidSignatureOrExpired)
    );
}

#[tokio::test]
async fn test_refresh_unrecorded_token_fails_closed() {
    let h = Harness::new();
    let session = h.register("unrecorded@example.com").await;
    let codec = h.issuer.codec();
    let claims = Claims::new(
        codec.issuer(),
        session.user.id,
        TokenType::Refresh,
        Uuid::new_v4().to_string(),
        session.tokens.device_id.clone(),
        start(),
        Some(Duration::days(30)),
    );
    let token = codec.sign(&claims).unwrap();

    assert_eq!(
        kind(h.sessions.refresh(&token).await),
        Some(AccessError::TokenRevoked)
    );
    // no subject-wide revocation for an unknown jti
    assert!(h.authenticate(&session.tokens.access_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_owner_not_found() {
    let h = Harness::new();
    let ghost = User::new(Uuid::new_v4(), "ghost@example.com", String::new(), "Ghost", start());
    let pair = h.issuer.issue_pair(ghost.id, "device-1").await.unwrap();

    assert_eq!(
        kind(h.sessions.refresh(&pair.refresh_token).await),
        Some(AccessError::OwnerNotFound)
    );
}

#[tokio::test]
async fn test_refresh_non_uuid_subject() {
    let h = Harness::new();
    let codec = h.issuer.codec();
    let mut claims = Claims::new(
        codec.issuer(),
        Uuid::new_v4(),
        TokenType::Refresh,
        Uuid::new_v4().to_string(),
        "device-1",
        start(),
        Some(Duration::days(30)),
    );
    claims.sub = "not-a-uuid".to_string();
    let token = codec.sign(&claims).unwrap();

    assert_eq!(
        kind(h.sessions.refresh(&token).await),
        Some(AccessError::OwnerNotFound)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_single_winner() {
    let h = Arc::new(Harness::new());
    let session = h.register("race@example.com").await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let h = Arc::clone(&h);
        let token = session.tokens.refresh_token.clone();
        handles.push(tokio::spawn(async move { h.sessions.refresh(&token).await }));
    }

    let mut successes = 0;
    let mut replays = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => {
                assert_eq!(e.access_kind(), Some(AccessError::TokenReplayDetected));
                replays += 1;
            }
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(replays, 1);
}
