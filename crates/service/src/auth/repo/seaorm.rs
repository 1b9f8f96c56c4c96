use sea_orm::DatabaseConnection;
use tracing::debug;
use uuid::Uuid;

use crate::auth::domain::{AccountUser, RegisterInput};
use crate::auth::errors::RepositoryError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AccountUser, RepositoryError> {
        let found = models::user::find_by_username(&self.db, username)
            .await?
            .ok_or(RepositoryError::InvalidCredentials)?;
        verify_password(password, &found.password_hash)?;
        Ok(found.into())
    }

    async fn create(&self, input: RegisterInput) -> Result<AccountUser, RepositoryError> {
        models::user::validate_new(&input.fields())?;
        let password_hash = hash_password(input.password.as_deref().unwrap_or_default())?;
        let new = models::user::NewUser {
            username: input.username.unwrap_or_default(),
            first_name: input.first_name.unwrap_or_default(),
            last_name: input.last_name.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            admin: input.admin.unwrap_or(false),
            password_hash,
        };
        let created = models::user::create(&self.db, new).await?;
        Ok(created.into())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let removed = models::user::hard_delete(&self.db, id).await?;
        if removed == 0 {
            debug!(user_id = %id, "delete requested for unknown user");
        }
        Ok(removed > 0)
    }
}
