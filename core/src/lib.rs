//! # Keyward Core
//!
//! Token lifecycle and revocation for the Keyward auth service: signed
//! access/refresh pairs per device session, per-token revocation, single-use
//! refresh rotation with replay detection, and per-request access checks.
//!
//! Persistence, password hashing, time and id generation are reached through
//! traits so that infrastructure crates can plug in real backends.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
