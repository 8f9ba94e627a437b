//! Credential digests for offline LawSphere accounts.
//!
//! [`super::LocalIdentityProvider`] never stores an account password. The
//! `password_hash` field of each record in the `accounts` collection holds an
//! Argon2id digest in PHC form (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`),
//! salted per account, so two citizens who pick the same password still get
//! different records.

use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AuthError;

/// Digest a new account password for the `accounts` collection.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| AuthError::Unknown(format!("cannot secure account password: {e}")))
}

/// Check a login attempt against the digest stored on the account.
///
/// A wrong password is `Ok(false)`. A stored digest that no longer parses means
/// the account record is damaged, which is reported as an error rather than as a
/// failed login.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let digest = PasswordHash::new(stored)
        .map_err(|e| AuthError::Unknown(format!("account credential is unreadable: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &digest) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Unknown(format!("cannot check account password: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_attempts_against_stored_digest() {
        let stored = hash_password("nyaya-2024").unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("nyaya-2024"));
        assert!(verify_password("nyaya-2024", &stored).unwrap());
        assert!(!verify_password("Nyaya-2024", &stored).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_records() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret1", &second).unwrap());
    }

    #[test]
    fn test_damaged_record_is_an_error() {
        let err = verify_password("secret1", "plain-text-left-behind").unwrap_err();
        assert!(matches!(err, AuthError::Unknown(msg) if msg.contains("unreadable")));
    }
}
