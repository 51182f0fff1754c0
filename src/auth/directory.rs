// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Boundary between the token core and the user store.
//!
//! The core never reaches into storage for users directly. It sees three
//! capabilities:
//!
//! - [`UserDirectory`]: resolve a username to a user record
//! - [`CredentialVerifier`]: check a username/secret pair
//! - [`CurrentPrincipal`]: the identity of the caller, supplied per request

use std::collections::BTreeSet;
use std::sync::Arc;

use super::error::AuthError;
use super::roles::Role;
use crate::storage::{Database, StoredUser, UserRepository};

/// An identity whose credentials have been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: u64,
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl From<StoredUser> for Principal {
    fn from(user: StoredUser) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            roles: user.roles,
        }
    }
}

/// Username → user record lookup.
pub trait UserDirectory: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, AuthError>;

    /// Load the record of whoever `principal` says is calling.
    fn resolve_current(&self, principal: &dyn CurrentPrincipal) -> Result<StoredUser, AuthError> {
        let username = principal
            .current_username()
            .ok_or(AuthError::Unauthenticated)?;
        self.find_by_username(username)?
            .ok_or_else(|| AuthError::UserNotFound(username.to_string()))
    }
}

/// Verifies a subject and secret, yielding the authenticated principal.
pub trait CredentialVerifier: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;
}

/// Accessor for the identity bound to the current call.
pub trait CurrentPrincipal {
    fn current_username(&self) -> Option<&str>;
}

/// [`UserDirectory`] over the embedded database.
#[derive(Debug, Clone)]
pub struct DatabaseDirectory {
    db: Arc<Database>,
}

impl DatabaseDirectory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl UserDirectory for DatabaseDirectory {
    fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, AuthError> {
        Ok(UserRepository::new(&self.db).find_by_username(username)?)
    }
}
