//! Session service module
//!
//! Register, login, logout (one device or all of them) and refresh-token
//! rotation with replay detection.

mod config;
mod password;
mod requests;
mod service;

#[cfg(test)]
mod tests;

pub use config::SessionServiceConfig;
pub use password::PasswordHasher;
pub use requests::{LoginRequest, RegisterRequest};
pub use service::SessionService;
