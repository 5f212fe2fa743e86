//! Password hashing using Argon2id
//!
//! A fresh random salt is generated per call, and verification runs through
//! the hash function's own constant-time comparison.
//!
//! # Example
//!
//! ```
//! use taskdock_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), taskdock_shared::error::AppError> {
//! let hash = hash_password("super_secret_password_1")?;
//! assert!(verify_password("super_secret_password_1", &hash)?);
//! assert!(!verify_password("wrong_password", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AppError, AppResult};

/// Hashes a plaintext password into a PHC-format Argon2id string
///
/// The salt is random per call, so hashing the same password twice yields
/// different strings.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored hash
///
/// Returns `Ok(false)` for a wrong password; an error only for a hash that
/// cannot be parsed at all.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("stored password hash is malformed: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}
