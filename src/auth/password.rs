// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing (Argon2id, PHC string format) and the password-based
//! credential verifier used by login.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::directory::{CredentialVerifier, Principal, UserDirectory};
use super::error::AuthError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))
}

/// Check a password against a stored PHC hash.
///
/// An unparseable hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Verifies username/password pairs against the user directory.
#[derive(Clone)]
pub struct PasswordVerifierService {
    directory: Arc<dyn UserDirectory>,
}

impl PasswordVerifierService {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

impl CredentialVerifier for PasswordVerifierService {
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        // Unknown user and wrong password are indistinguishable to the caller
        let user = self
            .directory
            .find_by_username(username)?
            .ok_or(AuthError::BadCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::BadCredentials);
        }

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::DatabaseDirectory;
    use crate::auth::Role;
    use crate::storage::{Database, NewUser, UserRepository};
    use std::collections::BTreeSet;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("password").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password", &hash));
        assert!(!verify_password("Password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("password").unwrap();
        let b = hash_password("password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("password", "not-a-phc-string"));
        assert!(!verify_password("", ""));
    }

    fn verifier_with_user(username: &str, password: &str) -> PasswordVerifierService {
        let db = Arc::new(Database::in_memory().unwrap());
        UserRepository::new(&db)
            .insert(NewUser {
                username: username.to_string(),
                password_hash: hash_password(password).unwrap(),
                roles: BTreeSet::from([Role::User]),
            })
            .unwrap();
        PasswordVerifierService::new(Arc::new(DatabaseDirectory::new(db)))
    }

    #[test]
    fn authenticate_returns_principal() {
        let verifier = verifier_with_user("testUser", "password");
        let principal = verifier.authenticate("testUser", "password").unwrap();
        assert_eq!(principal.username, "testUser");
        assert_eq!(principal.user_id, 1);
        assert!(principal.roles.contains(&Role::User));
    }

    #[test]
    fn authenticate_rejects_wrong_password_and_unknown_user() {
        let verifier = verifier_with_user("testUser", "password");
        assert!(matches!(
            verifier.authenticate("testUser", "wrong"),
            Err(AuthError::BadCredentials)
        ));
        assert!(matches!(
            verifier.authenticate("nobody", "password"),
            Err(AuthError::BadCredentials)
        ));
    }
}
