// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single redb database: the user directory and
//! the refresh token records. Access tokens are stateless and never stored.
//!
//! When `DATA_DIR` is configured the database is the file
//! `{DATA_DIR}/auth.redb`; otherwise an in-memory backend is used and all
//! state is lost on restart.

pub mod database;
pub mod repository;

pub use database::{Database, StorageError, StorageResult};
pub use repository::{NewUser, RefreshToken, RefreshTokenRepository, StoredUser, UserRepository};

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "auth.redb";
