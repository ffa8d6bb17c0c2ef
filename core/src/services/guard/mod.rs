//! Access guard: authenticates each request's bearer credential
//!
//! Extraction, signature and expiry checks, token type, revocation state and
//! owner lookup, in that order. The first failing step decides the error.

mod credentials;
mod service;


pub use credentials::{extract_bearer_token, select_credential, CREDENTIAL_COOKIE};
pub use service::AccessGuard;
