// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key-value database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized StoredUser
//! - `usernames`: username → user id (uniqueness index)
//! - `refresh_tokens`: token value → serialized RefreshToken
//! - `sequences`: sequence name → last allocated value

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary user table: id → serialized StoredUser (JSON bytes).
pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Index: username → id.
pub(crate) const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");

/// Refresh tokens keyed by their opaque value.
pub(crate) const REFRESH_TOKENS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("refresh_tokens");

/// Monotonic id sequences (e.g. "user_id" → last issued id).
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the embedded store.
///
/// redb serializes write transactions and gives readers a consistent
/// snapshot, so every repository call is atomic on its own.
pub struct Database {
    db: redb::Database,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database file at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = redb::Database::create(path)?;
        Self::with_tables(db)
    }

    /// Create a volatile database that lives only as long as the process.
    pub fn in_memory() -> StorageResult<Self> {
        let db = redb::Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::with_tables(db)
    }

    // Pre-create all tables so later read transactions don't fail
    fn with_tables(db: redb::Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
            let _ = write_txn.open_table(REFRESH_TOKENS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &redb::Database {
        &self.db
    }

    /// Verify the store can serve a read transaction.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(REFRESH_TOKENS)?;
        Ok(())
    }
}
