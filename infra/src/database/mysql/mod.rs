//! MySQL repository implementations.

pub mod code_repository_impl;
pub mod realm_repository_impl;

pub use code_repository_impl::MySqlCodeRepository;
pub use realm_repository_impl::MySqlRealmRepository;
