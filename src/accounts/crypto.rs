//! Argon2id password hashing.
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`)
//! with a fresh random salt per call. Parameters are fixed so every stored
//! hash carries the same work factor.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use tracing::error;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

fn argon2() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a password with a fresh salt.
///
/// # Errors
/// Returns an error if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash password: {e}"))?
        .to_string();
    Ok(hash)
}

/// Check `password` against a stored PHC hash. The comparison is constant-time.
///
/// # Errors
/// Returns an error only if the stored hash cannot be parsed; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("invalid password hash: {e}"))?;
    Ok(argon2()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Burn one verification against a throwaway hash.
///
/// Used when the username does not exist so the failure costs as much as a
/// wrong password.
pub fn verify_dummy(password: &str) {
    let Some(hash) = dummy_hash() else {
        return;
    };
    match PasswordHash::new(hash) {
        Ok(parsed) => {
            let _ = argon2().verify_password(password.as_bytes(), &parsed);
        }
        Err(e) => error!("Dummy password hash is unreadable: {e}"),
    }
}

// Only a successful hash is cached; a failure is retried on the next call.
fn dummy_hash() -> Option<&'static str> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Some(hash);
    }
    match hash_password("authbasics-dummy-password") {
        Ok(hash) => Some(DUMMY_HASH.get_or_init(|| hash)),
        Err(e) => {
            error!("Failed to build dummy password hash: {e:#}");
            None
        }
    }
}
