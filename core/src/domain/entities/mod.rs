//! Domain entities representing core business objects.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{
    Claims, IssuedToken, MintedPair, MintedToken, TokenPair, TokenType, DEFAULT_ISSUER,
};
pub use user::{normalize_email, User};
