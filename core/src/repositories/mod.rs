pub mod token;
pub mod user;

pub use token::{InMemoryRevocationStore, RevocationStore, RotationOutcome};
pub use user::{InMemoryUserRepository, UserRepository};
