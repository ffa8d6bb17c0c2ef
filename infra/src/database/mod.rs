//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and embedded migrations
//! - Revocation store and user repository implementations

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics, MIGRATOR};
pub use mysql::{MySqlRevocationStore, MySqlUserRepository};
