use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use rand::rngs::OsRng;

use super::errors::RepositoryError;

/// Hash a plaintext password into an argon2 PHC string.
pub fn hash_password(plain: &str) -> Result<String, RepositoryError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| RepositoryError::backend(format!("hashing error: {e}")))?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored PHC string. A mismatch is
/// `InvalidCredentials`; an unreadable hash is a backend error.
pub fn verify_password(plain: &str, stored: &str) -> Result<(), RepositoryError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| RepositoryError::backend(format!("stored hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .map_err(|_| RepositoryError::InvalidCredentials)
}
