//! Extraction of the bearer credential from request metadata

use crate::errors::AccessError;

/// Name of the cookie that may carry the credential instead of the header
pub const CREDENTIAL_COOKIE: &str = "Authorization";

const BEARER_PREFIX: &str = "Bearer ";

/// Picks the credential a request presents. The header wins; the cookie is
/// consulted only when the header is absent or blank.
pub fn select_credential<'a>(header: Option<&'a str>, cookie: Option<&'a str>) -> Option<&'a str> {
    header
        .filter(|h| !h.trim().is_empty())
        .or(cookie)
}

/// Strips the `Bearer ` prefix from a credential
///
/// # Returns
/// * `Ok(token)` - The compact token
/// * `Err(AccessError::TokenMissing)` - Nothing was presented
/// * `Err(AccessError::MalformedHeader)` - Any other shape
pub fn extract_bearer_token(credential: Option<&str>) -> Result<&str, AccessError> {
    let credential = match credential.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AccessError::TokenMissing),
    };

    match credential.strip_prefix(BEARER_PREFIX).map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AccessError::MalformedHeader),
    }
}
