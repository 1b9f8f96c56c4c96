//! Account business logic on top of `models`.
//! - `auth` holds the login / register / delete-account workflows.
//! - Persistence and token signing sit behind their own types so the
//!   workflows stay independent of the web framework.

pub mod auth;

#[cfg(test)]
pub(crate) mod test_support;
