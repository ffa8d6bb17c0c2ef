//! Configuration for the session service

use kw_shared::SessionConfig;

/// Configuration for the session service
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Whether new accounts may be created
    pub allow_registration: bool,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
        }
    }
}

impl From<&SessionConfig> for SessionServiceConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            allow_registration: config.allow_registration,
        }
    }
}
