//! Domain-specific error types and error handling.

mod types;

pub use types::{AccessError, AuthError, ValidationError};

use thiserror::Error;

/// Every failure that can cross the core boundary.
///
/// Semantic failures (`Access`, `Auth`, `Validation`) are final. `Unavailable`
/// marks a transient infrastructure problem the caller may retry; `Internal`
/// is anything unexpected.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Service temporarily unavailable: {message}")]
    Unavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    /// Shorthand for an unexpected fault
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Shorthand for a transient infrastructure fault
    pub fn unavailable(message: impl Into<String>) -> Self {
        DomainError::Unavailable {
            message: message.into(),
        }
    }

    /// Only transient infrastructure failures may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Unavailable { .. })
    }

    /// The access error kind, if this is one
    pub fn access_kind(&self) -> Option<AccessError> {
        match self {
            DomainError::Access(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let Some((field, details)) = fields.into_iter().next() else {
            return DomainError::Validation(ValidationError::InvalidFormat {
                field: String::from("request"),
            });
        };

        let error = match details.first() {
            Some(detail) if detail.code == "email" => ValidationError::InvalidEmail,
            Some(detail) if detail.code == "length" => {
                let bound = |name: &str| detail.params.get(name).and_then(|v| v.as_u64());
                ValidationError::InvalidLength {
                    field: field.to_string(),
                    min: bound("min").unwrap_or(0),
                    max: bound("max").unwrap_or(u64::MAX),
                }
            }
            _ => ValidationError::InvalidFormat {
                field: field.to_string(),
            },
        };
        DomainError::Validation(error)
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
