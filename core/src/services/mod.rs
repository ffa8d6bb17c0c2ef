//! Business services containing domain logic and use cases.

pub mod guard;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use guard::{AccessGuard, CREDENTIAL_COOKIE};
pub use session::{
    LoginRequest, PasswordHasher, RegisterRequest, SessionService, SessionServiceConfig,
};
pub use token::{
    Clock, FixedClock, IdGenerator, KeyManager, KeySource, SystemClock, TokenCodec, TokenIssuer,
    TokenServiceConfig, UuidGenerator,
};
