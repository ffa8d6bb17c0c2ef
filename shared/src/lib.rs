//! Shared configuration types for the Keyward workspace.
//!
//! Every crate in the workspace reads its settings from the types defined
//! here, so a deployment is described by exactly one [`AppConfig`].

pub mod config;

pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, Environment, JwtConfig, LogFormat, LoggingConfig,
    SessionConfig,
};
