//! Secret hashing. Argon2id PHC strings with a random 16-byte salt; secrets
//! are never stored or compared in plaintext.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::Lazy;
use password_hash::{PasswordHash, SaltString};

use crate::error::{AppError, AppResult};

// PHC hash verified when a login identifier is unknown, so a lookup miss
// costs the same as a secret mismatch. Fixed input, fixed salt.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    let salt = SaltString::encode_b64(b"authd.dummy.salt").expect("fixed salt encodes");
    Argon2::default()
        .hash_password(b"authd.dummy.secret", &salt)
        .expect("fixed-input hash")
        .to_string()
});

pub fn hash_secret(secret: &str) -> AppResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AppError::internal("salt_failed".to_string(), e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::internal("salt_failed".to_string(), e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| AppError::internal("hash_failed".to_string(), e.to_string()))?
        .to_string();
    Ok(phc)
}

pub fn verify_secret(hash: &str, secret: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(secret.as_bytes(), &parsed).is_ok()
    } else { false }
}

pub fn dummy_hash() -> &'static str { &DUMMY_HASH }
