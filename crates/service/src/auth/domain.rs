use models::user::RegistrationFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login input. Missing fields deserialize as empty strings and simply fail
/// authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration input. Every field is optional on the wire so that absent
/// values reach validation instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub admin: Option<bool>,
}

impl RegisterInput {
    pub fn fields(&self) -> RegistrationFields<'_> {
        RegistrationFields {
            username: self.username.as_deref(),
            password: self.password.as_deref(),
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

/// Domain user (business view, no password material)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub admin: bool,
}

impl From<models::user::Model> for AccountUser {
    fn from(m: models::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            admin: m.admin,
        }
    }
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: AccountUser,
    pub access_token: String,
}
