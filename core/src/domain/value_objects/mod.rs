//! Value objects handed across the core boundary.

pub mod principal;

// Re-export commonly used types
pub use principal::{AuthSession, Principal};
