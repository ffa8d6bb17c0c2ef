//! Classification of SQLx failures into domain errors

use kw_core::errors::DomainError;

/// Map a SQLx error onto the domain taxonomy.
///
/// Connection-level failures become [`DomainError::Unavailable`] so callers
/// may retry; everything else is [`DomainError::Internal`].
pub(crate) fn classify(context: &str, error: sqlx::Error) -> DomainError {
    if is_transient(&error) {
        tracing::error!(error = %error, "{}: database unavailable", context);
        DomainError::unavailable(format!("{}: {}", context, error))
    } else {
        tracing::error!(error = %error, "{}", context);
        DomainError::internal(format!("{}: {}", context, error))
    }
}

/// Whether the failure is about reaching the database rather than the query
pub(crate) fn is_transient(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

/// Whether the failure is a unique-key violation
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// Failure to read a column into a domain value
pub(crate) fn bad_row(column: &str, error: impl std::fmt::Display) -> DomainError {
    DomainError::internal(format!("Failed to read {}: {}", column, error))
}
