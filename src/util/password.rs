use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand_core::OsRng;

pub type HashError = argon2::password_hash::Error;

lazy_static! {
    /// Verified against when the username is unknown so both failure paths cost the same.
    static ref DUMMY_HASH: Option<String> = hash_password("league-admin-dummy-password").ok();
}

pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Constant-time check of `password` against a PHC-formatted argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HashError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn burn_dummy_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let first = hash_password("courtside").unwrap();
        let second = hash_password("courtside").unwrap();

        assert_ne!(first, second);
        assert!(!first.contains("courtside"));
        assert!(verify_password("courtside", &first).unwrap());
        assert!(verify_password("courtside", &second).unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_error() {
        let hash = hash_password("courtside").unwrap();
        assert!(!verify_password("baseline", &hash).unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        assert!(verify_password("courtside", "plaintext-in-db").is_err());
    }
}
