//! User entity representing a registered account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email, lower-cased and trimmed
    pub email: String,

    /// Password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Name shown to other users
    pub display_name: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance
    ///
    /// # Arguments
    ///
    /// * `id` - Account id, assigned by the caller
    /// * `email` - Login email, normalized here
    /// * `password_hash` - Already hashed password
    /// * `display_name` - Trimmed before storing
    /// * `now` - Creation and update timestamp
    pub fn new(
        id: Uuid,
        email: &str,
        password_hash: String,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: normalize_email(email),
            password_hash,
            display_name: display_name.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
