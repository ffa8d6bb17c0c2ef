//! MySQL implementation of the RevocationStore trait.
//!
//! One row per issued token in `issued_tokens`. Rows are only inserted and
//! flipped to revoked, never deleted here; expired rows are left for an
//! external cleanup job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use kw_core::domain::entities::token::{IssuedToken, TokenType};
use kw_core::errors::DomainError;
use kw_core::repositories::{RevocationStore, RotationOutcome};

use super::errors::{bad_row, classify, is_unique_violation};

const SELECT_COLUMNS: &str = r#"
    SELECT jti, subject_id, device_id, token_type, revoked, expires_at, issued_at
    FROM issued_tokens
"#;

/// MySQL implementation of RevocationStore
///
/// [`RevocationStore::rotate`] runs in one transaction whose conditional
/// `UPDATE` takes the row lock on the presented token, so concurrent
/// rotations of the same `jti` serialize and exactly one wins.
pub struct MySqlRevocationStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRevocationStore {
    /// Create a new MySQL revocation store
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to IssuedToken entity
    fn row_to_token(row: &MySqlRow) -> Result<IssuedToken, DomainError> {
        let subject_id: String = row
            .try_get("subject_id")
            .map_err(|e| bad_row("subject_id", e))?;
        let token_type: String = row
            .try_get("token_type")
            .map_err(|e| bad_row("token_type", e))?;

        Ok(IssuedToken {
            jti: row.try_get("jti").map_err(|e| bad_row("jti", e))?,
            subject_id: Uuid::parse_str(&subject_id).map_err(|e| bad_row("subject_id", e))?,
            device_id: row
                .try_get("device_id")
                .map_err(|e| bad_row("device_id", e))?,
            token_type: token_type
                .parse::<TokenType>()
                .map_err(|e| bad_row("token_type", e))?,
            revoked: row.try_get("revoked").map_err(|e| bad_row("revoked", e))?,
            expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("expires_at")
                .map_err(|e| bad_row("expires_at", e))?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| bad_row("issued_at", e))?,
        })
    }

    async fn begin(&self) -> Result<Transaction<'static, MySql>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| classify("Failed to begin transaction", e))
    }

    async fn commit(tx: Transaction<'static, MySql>) -> Result<(), DomainError> {
        tx.commit()
            .await
            .map_err(|e| classify("Failed to commit transaction", e))
    }

    /// Insert rows inside an open transaction
    async fn insert_all(
        tx: &mut Transaction<'static, MySql>,
        tokens: &[IssuedToken],
    ) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO issued_tokens (
                jti, subject_id, device_id, token_type, revoked, expires_at, issued_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        for token in tokens {
            sqlx::query(query)
                .bind(&token.jti)
                .bind(token.subject_id.to_string())
                .bind(&token.device_id)
                .bind(token.token_type.as_str())
                .bind(token.revoked)
                .bind(token.expires_at)
                .bind(token.issued_at)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        DomainError::internal(format!("Duplicate token id: {}", token.jti))
                    } else {
                        classify("Failed to record issued token", e)
                    }
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl RevocationStore for MySqlRevocationStore {
    async fn record(&self, tokens: &[IssuedToken]) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        Self::insert_all(&mut tx, tokens).await?;
        Self::commit(tx).await
    }

    async fn find(&self, jti: &str) -> Result<Option<IssuedToken>, DomainError> {
        let query = format!("{} WHERE jti = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Failed to find issued token", e))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        let revoked: Option<bool> =
            sqlx::query_scalar("SELECT revoked FROM issued_tokens WHERE jti = ?")
                .bind(jti)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| classify("Failed to check revocation", e))?;

        Ok(revoked.unwrap_or(false))
    }

    async fn revoke(&self, jti: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE issued_tokens SET revoked = TRUE WHERE jti = ? AND revoked = FALSE",
        )
        .bind(jti)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Failed to revoke token", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_device(
        &self,
        subject_id: Uuid,
        device_id: &str,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE issued_tokens
            SET revoked = TRUE
            WHERE subject_id = ? AND device_id = ? AND revoked = FALSE
            "#,
        )
        .bind(subject_id.to_string())
        .bind(device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Failed to revoke device tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn revoke_all_for_subject(&self, subject_id: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "UPDATE issued_tokens SET revoked = TRUE WHERE subject_id = ? AND revoked = FALSE",
        )
        .bind(subject_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Failed to revoke user tokens", e))?;

        Ok(result.rows_affected())
    }

    async fn rotate(
        &self,
        presented_jti: &str,
        subject_id: Uuid,
        device_id: &str,
        replacements: &[IssuedToken],
    ) -> Result<RotationOutcome, DomainError> {
        let mut tx = self.begin().await?;

        let consumed = sqlx::query(
            "UPDATE issued_tokens SET revoked = TRUE WHERE jti = ? AND revoked = FALSE",
        )
        .bind(presented_jti)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("Failed to consume refresh token", e))?;

        if consumed.rows_affected() == 0 {
            // Lost the race or never recorded; dropping `tx` rolls back
            let exists: Option<String> =
                sqlx::query_scalar("SELECT jti FROM issued_tokens WHERE jti = ?")
                    .bind(presented_jti)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| classify("Failed to look up refresh token", e))?;

            return Ok(match exists {
                Some(_) => RotationOutcome::AlreadyRevoked,
                None => RotationOutcome::Unknown,
            });
        }

        sqlx::query(
            r#"
            UPDATE issued_tokens
            SET revoked = TRUE
            WHERE subject_id = ? AND device_id = ? AND revoked = FALSE
            "#,
        )
        .bind(subject_id.to_string())
        .bind(device_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("Failed to revoke device tokens", e))?;

        Self::insert_all(&mut tx, replacements).await?;
        Self::commit(tx).await?;

        Ok(RotationOutcome::Rotated)
    }
}
