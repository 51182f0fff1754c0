// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use chrono::Utc;

use crate::auth::{
    AuthService, DatabaseDirectory, PasswordVerifierService, RefreshTokenService, TokenCodec,
    UserDirectory,
};
use crate::config::{ConfigError, TokenSettings};
use crate::storage::Database;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub directory: Arc<dyn UserDirectory>,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the auth components over `db`.
    pub fn new(db: Arc<Database>, tokens: &TokenSettings) -> Result<Self, ConfigError> {
        let access_ttl = token_ttl(crate::config::ACCESS_TOKEN_TTL_ENV, tokens.access_ttl)?;
        let refresh_ttl = token_ttl(crate::config::REFRESH_TOKEN_TTL_ENV, tokens.refresh_ttl)?;

        let directory: Arc<dyn UserDirectory> = Arc::new(DatabaseDirectory::new(db.clone()));
        let codec = Arc::new(TokenCodec::new(&tokens.secret, access_ttl));
        let refresh_tokens = RefreshTokenService::new(db.clone(), directory.clone(), refresh_ttl);
        let credentials = Arc::new(PasswordVerifierService::new(directory.clone()));

        Ok(Self {
            db,
            directory,
            auth: AuthService::new(codec, refresh_tokens, credentials),
        })
    }
}

/// Convert a lifetime, rejecting any that would overflow an expiry timestamp.
fn token_ttl(name: &'static str, ttl: std::time::Duration) -> Result<chrono::Duration, ConfigError> {
    chrono::Duration::from_std(ttl)
        .ok()
        .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| ConfigError::Invalid {
            name,
            value: ttl.as_secs().to_string(),
        })
}

/// State over a fresh in-memory database, for tests.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let tokens = TokenSettings {
        secret: b"test-signing-key-with-at-least-32-bytes!".to_vec(),
        access_ttl: std::time::Duration::from_secs(3600),
        refresh_ttl: std::time::Duration::from_secs(600),
    };
    let db = Arc::new(Database::in_memory().expect("in-memory database"));
    AppState::new(db, &tokens).expect("valid token settings")
}
