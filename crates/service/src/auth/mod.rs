//! Auth module: three-layer architecture (domain, repository, service),
//! plus the token and password primitives the service is built from.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::AccountService;
pub use token::TokenService;
