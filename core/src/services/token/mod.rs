//! Token lifecycle: signing, verification and issuance of access/refresh pairs
//!
//! - [`TokenCodec`] signs and verifies JWTs for one algorithm and issuer
//! - [`TokenIssuer`] mints pairs and records them in the revocation store
//! - [`KeyManager`] loads HMAC, RSA, EC and Ed25519 key material
//! - [`clock`] and [`ids`] are the injectable time and id sources

pub mod clock;
mod codec;
mod config;
pub mod ids;
mod issuer;
mod key_manager;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::TokenCodec;
pub use config::{KeySource, TokenServiceConfig};
pub use ids::{IdGenerator, UuidGenerator};
pub use issuer::TokenIssuer;
pub use key_manager::KeyManager;
