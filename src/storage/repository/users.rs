// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Users are stored as JSON under their numeric id, with a separate
//! username → id index that enforces unique usernames.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};

use super::super::database::{SEQUENCES, USERNAMES, USERS};
use super::super::{Database, StorageError, StorageResult};
use crate::auth::Role;

const USER_ID_SEQUENCE: &str = "user_id";

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Numeric identifier, allocated on insert
    pub id: u64,
    /// Unique login name
    pub username: String,
    /// PHC-formatted password hash (never the plain password)
    pub password_hash: String,
    /// Granted roles
    pub roles: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a user; the id is assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

/// Repository for user records.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new user, allocating its id.
    ///
    /// Fails with `AlreadyExists` if the username is taken.
    pub fn insert(&self, user: NewUser) -> StorageResult<StoredUser> {
        let write_txn = self.db.inner().begin_write()?;
        let stored = {
            let mut names = write_txn.open_table(USERNAMES)?;
            if names.get(user.username.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!(
                    "User {}",
                    user.username
                )));
            }

            let id = next_sequence(&write_txn, USER_ID_SEQUENCE)?;
            let now = Utc::now();
            let stored = StoredUser {
                id,
                username: user.username,
                password_hash: user.password_hash,
                roles: user.roles,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&stored)?;
            write_txn.open_table(USERS)?.insert(id, json.as_slice())?;
            names.insert(stored.username.as_str(), id)?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }

    /// Replace an existing user record, keeping its creation time.
    ///
    /// Renames move the username index entry and fail with `AlreadyExists`
    /// if the new name belongs to someone else.
    pub fn update(&self, user: &StoredUser) -> StorageResult<StoredUser> {
        let write_txn = self.db.inner().begin_write()?;
        let updated = {
            let mut users = write_txn.open_table(USERS)?;

            let existing: StoredUser = {
                let guard = users
                    .get(user.id)?
                    .ok_or_else(|| StorageError::NotFound(format!("User {}", user.id)))?;
                serde_json::from_slice(guard.value())?
            };

            if existing.username != user.username {
                let mut names = write_txn.open_table(USERNAMES)?;
                if names.get(user.username.as_str())?.is_some() {
                    return Err(StorageError::AlreadyExists(format!(
                        "User {}",
                        user.username
                    )));
                }
                names.remove(existing.username.as_str())?;
                names.insert(user.username.as_str(), user.id)?;
            }

            let updated = StoredUser {
                created_at: existing.created_at,
                updated_at: Utc::now(),
                ..user.clone()
            };
            let json = serde_json::to_vec(&updated)?;
            users.insert(user.id, json.as_slice())?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Get a user by id.
    pub fn get(&self, id: u64) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let user = match table.get(id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(user)
    }

    /// Look up a user by exact username.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.inner().begin_read()?;
        let names = read_txn.open_table(USERNAMES)?;
        let Some(id) = names.get(username)?.map(|v| v.value()) else {
            return Ok(None);
        };

        let users = read_txn.open_table(USERS)?;
        let user = match users.get(id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(user)
    }

    /// List all users ordered by id.
    pub fn list(&self) -> StorageResult<Vec<StoredUser>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(USERS)?;

        let mut users = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            users.push(serde_json::from_slice(value.value())?);
        }
        Ok(users)
    }

    /// Delete a user and its username index entry, returning the removed record.
    pub fn delete(&self, id: u64) -> StorageResult<StoredUser> {
        let write_txn = self.db.inner().begin_write()?;
        let removed = {
            let mut users = write_txn.open_table(USERS)?;
            let Some(bytes) = users.remove(id)?.map(|v| v.value().to_vec()) else {
                return Err(StorageError::NotFound(format!("User {id}")));
            };
            let user: StoredUser = serde_json::from_slice(&bytes)?;

            write_txn
                .open_table(USERNAMES)?
                .remove(user.username.as_str())?;
            user
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

/// Allocate the next value of a named sequence inside an open write transaction.
fn next_sequence(write_txn: &WriteTransaction, name: &str) -> StorageResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let next = table.get(name)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(name, next)?;
    Ok(next)
}
