//! Tests for register, login and logout

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AccessError, AuthError, DomainError, ValidationError};
use crate::repositories::{RevocationStore, UserRepository};
use crate::services::session::{LoginRequest, RegisterRequest, SessionServiceConfig};

use super::mocks::{Harness, SequentialUuids, PASSWORD};

#[tokio::test]
async fn test_register_opens_session() {
    let h = Harness::new();
    let session = h.register("  New.User@Example.com ").await;

    assert_eq!(session.user.email, "new.user@example.com");
    assert_eq!(session.user.display_name, "Tester");
    assert_ne!(session.user.password_hash, PASSWORD);

    let stored = h.users.find_by_id(session.user.id).await.unwrap();
    assert_eq!(stored, Some(session.user.clone()));

    let principal = h.authenticate(&session.tokens.access_token).await.unwrap();
    assert_eq!(principal.user.id, session.user.id);
    assert_eq!(principal.device_id, session.tokens.device_id);
}

#[tokio::test]
async fn test_register_takes_user_id_from_generator() {
    let h = Harness::with_ids(
        SessionServiceConfig::default(),
        Arc::new(SequentialUuids::default()),
    );
    let session = h.register("ids@example.com").await;

    assert_eq!(session.user.id, Uuid::from_u128(1));
    assert_eq!(session.tokens.device_id, Uuid::from_u128(2).to_string());

    let stored = h.users.find_by_email("ids@example.com").await.unwrap();
    assert_eq!(stored.map(|u| u.id), Some(Uuid::from_u128(1)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let h = Harness::new();
    h.register("dup@example.com").await;

    let result = h
        .sessions
        .register(RegisterRequest::new("DUP@example.com", PASSWORD, "Other"))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::EmailAlreadyRegistered))
    ));
}

#[tokio::test]
async fn test_register_disabled() {
    let h = Harness::with_config(SessionServiceConfig {
        allow_registration: false,
    });

    let result = h
        .sessions
        .register(RegisterRequest::new("a@example.com", PASSWORD, "A"))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::RegistrationDisabled))
    ));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_register_validation() {
    let h = Harness::new();

    let bad_email = h
        .sessions
        .register(RegisterRequest::new("not-an-email", PASSWORD, "A"))
        .await;
    assert!(matches!(
        bad_email,
        Err(DomainError::Validation(ValidationError::InvalidEmail))
    ));

    let short_password = h
        .sessions
        .register(RegisterRequest::new("a@example.com", "short", "A"))
        .await;
    assert!(matches!(
        short_password,
        Err(DomainError::Validation(ValidationError::InvalidLength { ref field, min: 8, max: 128 }))
            if field == "password"
    ));

    let blank_name = h
        .sessions
        .register(RegisterRequest::new("a@example.com", PASSWORD, "   "))
        .await;
    assert!(matches!(
        blank_name,
        Err(DomainError::Validation(ValidationError::InvalidLength { ref field, .. }))
            if field == "display_name"
    ));

    let long_name = h
        .sessions
        .register(RegisterRequest::new("a@example.com", PASSWORD, "x".repeat(65)))
        .await;
    assert!(matches!(
        long_name,
        Err(DomainError::Validation(ValidationError::InvalidLength { max: 64, .. }))
    ));

    assert!(h.users.find_by_email("a@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_opens_new_device_session() {
    let h = Harness::new();
    let registered = h.register("login@example.com").await;

    let session = h.login("LOGIN@example.com").await;

    assert_eq!(session.user.id, registered.user.id);
    assert_ne!(session.tokens.device_id, registered.tokens.device_id);
    assert!(h.authenticate(&session.tokens.access_token).await.is_ok());
    assert!(h.authenticate(&registered.tokens.access_token).await.is_ok());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = Harness::new();
    h.register("known@example.com").await;

    let wrong_password = h
        .sessions
        .login(LoginRequest::new("known@example.com", "wrong password"))
        .await
        .unwrap_err();
    let unknown_email = h
        .sessions
        .login(LoginRequest::new("unknown@example.com", PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(
        wrong_password,
        DomainError::Auth(AuthError::InvalidCredentials)
    ));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_logout_revokes_only_that_device() {
    let h = Harness::new();
    let phone = h.register("multi@example.com").await;
    let laptop = h.login("multi@example.com").await;

    let principal = h.authenticate(&phone.tokens.access_token).await.unwrap();
    assert_eq!(h.sessions.logout(&principal).await.unwrap(), 2);

    assert_eq!(
        h.authenticate(&phone.tokens.access_token)
            .await
            .unwrap_err()
            .access_kind(),
        Some(AccessError::TokenRevoked)
    );
    assert!(h.authenticate(&laptop.tokens.access_token).await.is_ok());

    // idempotent
    assert_eq!(h.sessions.logout(&principal).await.unwrap(), 0);
}

#[tokio::test]
async fn test_logout_everywhere() {
    let h = Harness::new();
    let phone = h.register("everywhere@example.com").await;
    let laptop = h.login("everywhere@example.com").await;
    let other = h.register("bystander@example.com").await;

    let principal = h.authenticate(&laptop.tokens.access_token).await.unwrap();
    assert_eq!(h.sessions.logout_everywhere(&principal).await.unwrap(), 4);

    for token in [&phone.tokens.access_token, &laptop.tokens.access_token] {
        assert_eq!(
            h.authenticate(token).await.unwrap_err().access_kind(),
            Some(AccessError::TokenRevoked)
        );
    }
    assert!(h.authenticate(&other.tokens.access_token).await.is_ok());
    assert!(!h
        .store
        .is_revoked(&h.issuer.codec().verify(&other.tokens.refresh_token).unwrap().jti)
        .await
        .unwrap());
}
