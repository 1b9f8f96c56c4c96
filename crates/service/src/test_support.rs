#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::domain::{AccountUser, RegisterInput};
use crate::auth::errors::RepositoryError;
use crate::auth::repository::{mock::MockUserRepository, UserRepository};
use crate::auth::{AccountService, TokenService};

pub const SIGNING_PRIVATE_PEM: &[u8] = include_bytes!("../testdata/signing_private.pem");
pub const SIGNING_PUBLIC_PEM: &[u8] = include_bytes!("../testdata/signing_public.pem");
pub const FOREIGN_PRIVATE_PEM: &[u8] = include_bytes!("../testdata/foreign_private.pem");
pub const FOREIGN_PUBLIC_PEM: &[u8] = include_bytes!("../testdata/foreign_public.pem");

pub fn signing_tokens(lifetime: Duration) -> TokenService {
    TokenService::from_pem(SIGNING_PRIVATE_PEM, SIGNING_PUBLIC_PEM, lifetime).expect("signing fixture keys")
}

pub fn foreign_tokens(lifetime: Duration) -> TokenService {
    TokenService::from_pem(FOREIGN_PRIVATE_PEM, FOREIGN_PUBLIC_PEM, lifetime).expect("foreign fixture keys")
}

pub fn sample_user() -> AccountUser {
    AccountUser {
        id: Uuid::new_v4(),
        username: "ada".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        admin: false,
    }
}

pub fn registration(username: &str) -> RegisterInput {
    RegisterInput {
        username: Some(username.into()),
        password: Some("Passw0rd-long".into()),
        first_name: Some("Grace".into()),
        last_name: Some("Hopper".into()),
        email: Some(format!("{username}@example.com")),
        admin: Some(false),
    }
}

pub fn account_service(lifetime: Duration) -> (Arc<MockUserRepository>, AccountService<MockUserRepository>) {
    let repo = Arc::new(MockUserRepository::default());
    let svc = AccountService::new(repo.clone(), Arc::new(signing_tokens(lifetime)));
    (repo, svc)
}

/// Repository whose every call fails with the error `fail` builds.
pub struct FailingUserRepository {
    fail: fn() -> RepositoryError,
}

impl FailingUserRepository {
    pub fn new(fail: fn() -> RepositoryError) -> Self {
        Self { fail }
    }
}

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn authenticate(&self, _username: &str, _password: &str) -> Result<AccountUser, RepositoryError> {
        Err((self.fail)())
    }

    async fn create(&self, _input: RegisterInput) -> Result<AccountUser, RepositoryError> {
        Err((self.fail)())
    }

    async fn delete_by_id(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err((self.fail)())
    }
}

pub fn failing_service(fail: fn() -> RepositoryError) -> AccountService<FailingUserRepository> {
    AccountService::new(Arc::new(FailingUserRepository::new(fail)), Arc::new(signing_tokens(Duration::from_secs(3600))))
}
