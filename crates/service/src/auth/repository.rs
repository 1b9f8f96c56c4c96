use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AccountUser, RegisterInput};
use super::errors::RepositoryError;

/// Persistence abstraction for accounts. Implementations own validation,
/// password hashing and uniqueness.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up `username` and check `password` against the stored hash.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AccountUser, RepositoryError>;

    async fn create(&self, input: RegisterInput) -> Result<AccountUser, RepositoryError>;

    /// Delete by id in a single statement; `true` when a row was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use models::user::validate_new;

    use crate::auth::password::{hash_password, verify_password};

    struct StoredUser {
        user: AccountUser,
        password_hash: String,
    }

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<Uuid, StoredUser>>,
    }

    impl MockUserRepository {
        pub fn contains(&self, id: Uuid) -> bool {
            self.users.lock().unwrap().contains_key(&id)
        }

        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Stored hash for `id`, to check that plaintext never lands in storage.
        pub fn password_hash(&self, id: Uuid) -> Option<String> {
            self.users.lock().unwrap().get(&id).map(|s| s.password_hash.clone())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn authenticate(&self, username: &str, password: &str) -> Result<AccountUser, RepositoryError> {
            let (user, hash) = {
                let users = self.users.lock().unwrap();
                let stored = users
                    .values()
                    .find(|s| s.user.username == username)
                    .ok_or(RepositoryError::InvalidCredentials)?;
                (stored.user.clone(), stored.password_hash.clone())
            };
            verify_password(password, &hash)?;
            Ok(user)
        }

        async fn create(&self, input: RegisterInput) -> Result<AccountUser, RepositoryError> {
            validate_new(&input.fields())?;
            let password_hash = hash_password(input.password.as_deref().unwrap_or_default())?;

            let mut users = self.users.lock().unwrap();
            let username = input.username.unwrap_or_default();
            if users.values().any(|s| s.user.username == username) {
                return Err(RepositoryError::Duplicate(format!("username `{username}` already exists")));
            }
            let user = AccountUser {
                id: Uuid::new_v4(),
                username,
                first_name: input.first_name.unwrap_or_default(),
                last_name: input.last_name.unwrap_or_default(),
                email: input.email.unwrap_or_default(),
                admin: input.admin.unwrap_or(false),
            };
            users.insert(user.id, StoredUser { user: user.clone(), password_hash });
            Ok(user)
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
            let mut users = self.users.lock().unwrap();
            Ok(users.remove(&id).is_some())
        }
    }
}
