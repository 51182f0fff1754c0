// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides CRUD operations for a specific entity type.

pub mod refresh_tokens;
pub mod users;

pub use refresh_tokens::{RefreshToken, RefreshTokenRepository};
pub use users::{NewUser, StoredUser, UserRepository};
