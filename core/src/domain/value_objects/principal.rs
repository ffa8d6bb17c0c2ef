//! Results of authenticating a request or opening a session.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{TokenPair, User};

/// The authenticated caller of one request.
///
/// Returned by value from the access guard; nothing is stashed in ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Owner of the presented token
    pub user: User,

    /// Device session of the presented token
    pub device_id: String,

    /// `jti` of the presented access token
    pub jti: String,
}

/// A freshly opened session: the account plus its first token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
}
