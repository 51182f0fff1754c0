// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh token repository.
//!
//! Records are keyed by the opaque token value. Several live tokens may
//! belong to the same user at once.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::super::database::REFRESH_TOKENS;
use super::super::{Database, StorageResult};

/// Refresh token as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshToken {
    /// Opaque, high-entropy token value handed to the client
    pub token: String,
    /// Username the token was issued for
    pub subject: String,
    /// Id of the user record behind `subject`
    pub user_id: u64,
    /// The token is valid strictly before this instant
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Repository for refresh token records.
pub struct RefreshTokenRepository<'a> {
    db: &'a Database,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new RefreshTokenRepository.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Persist a token record (overwrites a record with the same value).
    pub fn insert(&self, token: &RefreshToken) -> StorageResult<()> {
        let json = serde_json::to_vec(token)?;
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;
            table.insert(token.token.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a token by value.
    pub fn get(&self, token: &str) -> StorageResult<Option<RefreshToken>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(REFRESH_TOKENS)?;
        let record = match table.get(token)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(record)
    }

    /// Delete a token by value. Returns whether a record was removed.
    pub fn delete(&self, token: &str) -> StorageResult<bool> {
        let write_txn = self.db.inner().begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;
            let removed = table.remove(token)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// List every stored token.
    pub fn list(&self) -> StorageResult<Vec<RefreshToken>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(REFRESH_TOKENS)?;

        let mut tokens = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            tokens.push(serde_json::from_slice(value.value())?);
        }
        Ok(tokens)
    }

    /// Delete all tokens issued to a user. Returns the number removed.
    pub fn delete_for_user(&self, user_id: u64) -> StorageResult<usize> {
        self.delete_where(|token| token.user_id == user_id)
    }

    /// Delete all tokens expired at `now`. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        self.delete_where(|token| token.is_expired_at(now))
    }

    // Scan and delete inside a single write transaction
    fn delete_where(&self, predicate: impl Fn(&RefreshToken) -> bool) -> StorageResult<usize> {
        let write_txn = self.db.inner().begin_write()?;
        let count = {
            let mut table = write_txn.open_table(REFRESH_TOKENS)?;

            let mut doomed = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let token: RefreshToken = serde_json::from_slice(value.value())?;
                if predicate(&token) {
                    doomed.push(key.value().to_string());
                }
            }

            for key in &doomed {
                table.remove(key.as_str())?;
            }
            doomed.len()
        };
        write_txn.commit()?;
        Ok(count)
    }
}
