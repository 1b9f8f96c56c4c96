use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub admin: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Raw registration fields as they arrive from a client, before hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistrationFields<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// A validated user ready for insertion; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub admin: bool,
    pub password_hash: String,
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ModelError::Validation(format!("`{email}` is not a valid email address"))),
    }
}

pub fn validate_name(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("`{field}` is required")));
    }
    Ok(())
}

/// Check every required field and report all problems at once.
pub fn validate_new(fields: &RegistrationFields<'_>) -> Result<(), ModelError> {
    let mut problems = Vec::new();
    let required = [
        ("username", fields.username),
        ("password", fields.password),
        ("firstName", fields.first_name),
        ("lastName", fields.last_name),
        ("email", fields.email),
    ];
    for (name, value) in required {
        match value {
            None => problems.push(format!("`{name}` is required")),
            Some(v) => {
                if let Err(ModelError::Validation(msg)) = validate_name(name, v) {
                    problems.push(msg);
                }
            }
        }
    }

    if let Some(username) = fields.username {
        if username.chars().count() > USERNAME_MAX_LEN {
            problems.push(format!("`username` must be at most {USERNAME_MAX_LEN} characters"));
        }
    }
    if let Some(password) = fields.password.filter(|p| !p.trim().is_empty()) {
        if password.chars().count() < PASSWORD_MIN_LEN {
            problems.push(format!("`password` must be at least {PASSWORD_MIN_LEN} characters"));
        }
    }
    if let Some(email) = fields.email.filter(|e| !e.trim().is_empty()) {
        if let Err(ModelError::Validation(msg)) = validate_email(email) {
            problems.push(msg);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ModelError::Validation(problems.join("; ")))
    }
}

pub async fn create(db: &DatabaseConnection, new: NewUser) -> Result<Model, ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(new.username),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(new.email),
        admin: Set(new.admin),
        password_hash: Set(new.password_hash),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?)
}

/// Remove a user; returns the number of rows deleted (0 when the id is unknown).
pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<u64, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected)
}
