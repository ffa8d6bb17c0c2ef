//! Error kinds grouped by the boundary they describe
//!
//! Messages are plain English; the presentation layer maps [`AccessError::code`]
//! and friends to transport responses.

use thiserror::Error;

/// Outcomes of authenticating or refreshing a token.
///
/// All variants are terminal: none of them is retried internally and none
/// becomes valid by retrying the same request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access-token header is not set")]
    TokenMissing,

    #[error("Access-token must have the form \"Bearer <TOKEN>\"")]
    MalformedHeader,

    #[error("The transferred token is invalid")]
    InvalidSignatureOrExpired,

    #[error("The passed token does not match the required type")]
    WrongTokenType,

    #[error("This token has been revoked")]
    TokenRevoked,

    #[error("This token has already been revoked")]
    TokenReplayDetected,

    #[error("The owner of this token has not been found")]
    OwnerNotFound,
}

impl AccessError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::TokenMissing => "token_is_not_specified",
            AccessError::MalformedHeader => "incorrect_auth_header_form",
            AccessError::InvalidSignatureOrExpired => "invalid_token",
            AccessError::WrongTokenType => "incorrect_token_type",
            AccessError::TokenRevoked => "token_revoked",
            AccessError::TokenReplayDetected => "token_already_revoked",
            AccessError::OwnerNotFound => "token_owner_not_found",
        }
    }

    /// Whether the credential was absent or unreadable, as opposed to present but refused
    pub fn is_bad_request(&self) -> bool {
        matches!(self, AccessError::TokenMissing | AccessError::MalformedHeader)
    }
}

/// Account-level failures of register and login
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("This email is already registered")]
    EmailAlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Registration is currently disabled")]
    RegistrationDisabled,
}

impl AuthError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailAlreadyRegistered => "email_occupied",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::RegistrationDisabled => "registration_disabled",
        }
    }
}

/// Rejected user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid length: {field} (min: {min}, max: {max})")]
    InvalidLength {
        field: String,
        min: u64,
        max: u64,
    },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },
}
