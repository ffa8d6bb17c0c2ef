//! MySQL repository implementations

mod errors;
pub mod token_repository_impl;
pub mod user_repository_impl;

pub use token_repository_impl::MySqlRevocationStore;
pub use user_repository_impl::MySqlUserRepository;
