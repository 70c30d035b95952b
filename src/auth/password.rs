use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The stored hash is well-formed but does not match the password.
    #[error("password mismatch")]
    Mismatch,

    #[error("password verification failed: {0}")]
    Verification(String),
}

lazy_static! {
    // Verified against when the email is unknown, so that path costs as much
    // as a wrong password.
    static ref DUMMY_HASH: Option<String> = match hash_password("motomarket::dummy-credential") {
        Ok(hash) => Some(hash),
        Err(e) => {
            error!(error = %e, "dummy credential unavailable; unknown-email sign-ins will be faster");
            None
        }
    };
}

/// Builds the dummy hash now so the first unknown-email sign-in does not pay for it.
pub fn warm_up() {
    lazy_static::initialize(&DUMMY_HASH);
}

pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        PasswordError::Verification(e.to_string())
    })?;

    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(password_hash::Error::Password) => Err(PasswordError::Mismatch),
        Err(e) => {
            error!(error = %e, "argon2 verify_password error");
            Err(PasswordError::Verification(e.to_string()))
        }
    }
}

/// Burns one verification against a fixed hash. The outcome is irrelevant.
pub fn verify_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}
