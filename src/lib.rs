// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session Auth Server - JWT access tokens with persistent refresh tokens
//!
//! This crate provides a single-realm authentication service: username and
//! password login, access token refresh, and user management behind bearer
//! tokens, persisted in an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, refresh tokens, login orchestration
//! - `config` - Environment configuration
//! - `storage` - Embedded database and repositories
//! - `sweeper` - Background purge of expired refresh tokens

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod sweeper;
pub mod telemetry;
