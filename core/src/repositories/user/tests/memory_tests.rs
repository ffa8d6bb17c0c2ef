//! Unit tests for the in-memory user repository

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::user::{InMemoryUserRepository, UserRepository};

fn user(email: &str) -> User {
    User::new(Uuid::new_v4(), email, "hash".to_string(), "Tester", Utc::now())
}

#[tokio::test]
async fn test_create_and_find_user() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create(user("bob@example.com")).await.unwrap();

    let by_id = repo.find_by_id(created.id).await.unwrap();
    assert_eq!(by_id, Some(created.clone()));

    let by_email = repo.find_by_email("bob@example.com").await.unwrap();
    assert_eq!(by_email, Some(created));
}

#[tokio::test]
async fn test_find_by_email_normalizes_input() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create(user("carol@example.com")).await.unwrap();

    let found = repo.find_by_email("  CAROL@Example.com ").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(created.id));
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let repo = InMemoryUserRepository::new();
    repo.create(user("dave@example.com")).await.unwrap();

    let result = repo.create(user("Dave@example.com")).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::EmailAlreadyRegistered))
    ));
}

#[tokio::test]
async fn test_missing_user() {
    let repo = InMemoryUserRepository::new();
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
}
