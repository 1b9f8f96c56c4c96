use models::errors::ModelError;
use thiserror::Error;

/// Failures reported by a [`UserRepository`](super::repository::UserRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Anything else the backend raised; `status` is set when the backend
    /// already knows which HTTP status fits.
    #[error("backend error: {message}")]
    Backend { status: Option<u16>, message: String },
}

impl RepositoryError {
    pub fn backend(message: impl Into<String>) -> Self {
        RepositoryError::Backend { status: None, message: message.into() }
    }
}

impl From<ModelError> for RepositoryError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => RepositoryError::Validation(msg),
            ModelError::Duplicate(msg) => RepositoryError::Duplicate(msg),
            ModelError::Db(msg) => RepositoryError::Backend { status: Some(500), message: msg },
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid key material: {0}")]
    Key(String),
    #[error("token signing failed: {0}")]
    Sign(String),
    /// Malformed, expired, or signed by a different key.
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Outcome categories surfaced by the account workflows. Each variant keeps
/// the underlying cause for diagnostics.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("unclassified error: {message}")]
    Unknown { status: Option<u16>, message: String },
}

impl AuthError {
    /// HTTP status this error translates to.
    pub fn status(&self) -> u16 {
        match self {
            AuthError::Unauthorized(_) => 401,
            AuthError::ValidationFailed(_) => 400,
            AuthError::Conflict(_) => 409,
            AuthError::Internal(_) => 500,
            AuthError::Unknown { status, .. } => status.unwrap_or(500),
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::ValidationFailed(_) => 1001,
            AuthError::Conflict(_) => 1002,
            AuthError::Unauthorized(_) => 1004,
            AuthError::Internal(_) => 1200,
            AuthError::Unknown { .. } => 1900,
        }
    }

    /// The underlying cause, for logs only.
    pub fn cause(&self) -> &str {
        match self {
            AuthError::Unauthorized(c)
            | AuthError::ValidationFailed(c)
            | AuthError::Conflict(c)
            | AuthError::Internal(c) => c,
            AuthError::Unknown { message, .. } => message,
        }
    }
}
