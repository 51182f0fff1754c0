// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh token lifecycle.
//!
//! A refresh token is an opaque random value bound to a user and an expiry
//! instant. It is valid strictly before that instant. Checking an expired
//! token deletes it, so once a check has failed the value is gone for good.
//!
//! Several live tokens per user are allowed; creating one never revokes
//! another.

use std::sync::Arc;

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, info};

use super::directory::UserDirectory;
use super::error::AuthError;
use crate::storage::{Database, RefreshToken, RefreshTokenRepository};

/// Random bytes per token value (256 bits).
const TOKEN_BYTES: usize = 32;

/// Creates, looks up and expires refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenService {
    db: Arc<Database>,
    directory: Arc<dyn UserDirectory>,
    ttl: Duration,
    rng: SystemRandom,
}

impl std::fmt::Debug for RefreshTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenService")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl RefreshTokenService {
    pub fn new(db: Arc<Database>, directory: Arc<dyn UserDirectory>, ttl: Duration) -> Self {
        Self {
            db,
            directory,
            ttl,
            rng: SystemRandom::new(),
        }
    }

    /// Mint and persist a fresh token for `subject`.
    ///
    /// Fails with [`AuthError::UserNotFound`] if the directory has no such user.
    pub fn create(&self, subject: &str) -> Result<RefreshToken, AuthError> {
        let user = self
            .directory
            .find_by_username(subject)?
            .ok_or_else(|| AuthError::UserNotFound(subject.to_string()))?;

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Internal("refresh token expiry out of range".into()))?;
        let token = RefreshToken {
            token: self.generate_value()?,
            subject: user.username,
            user_id: user.id,
            expires_at,
            created_at: now,
        };
        RefreshTokenRepository::new(&self.db).insert(&token)?;

        debug!(user_id = token.user_id, expires_at = %token.expires_at, "Refresh token created");
        Ok(token)
    }

    /// Look up a token by value. `None` means unknown or already removed.
    pub fn find_by_token(&self, value: &str) -> Result<Option<RefreshToken>, AuthError> {
        Ok(RefreshTokenRepository::new(&self.db).get(value)?)
    }

    /// Return the token unchanged if it is still valid, otherwise delete it
    /// and fail with [`AuthError::RefreshTokenExpired`].
    pub fn verify_expiration(&self, token: RefreshToken) -> Result<RefreshToken, AuthError> {
        self.verify_expiration_at(token, Utc::now())
    }

    fn verify_expiration_at(
        &self,
        token: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<RefreshToken, AuthError> {
        if !token.is_expired_at(now) {
            return Ok(token);
        }

        RefreshTokenRepository::new(&self.db).delete(&token.token)?;
        info!(user_id = token.user_id, expired_at = %token.expires_at, "Expired refresh token revoked");
        Err(AuthError::RefreshTokenExpired(token.token))
    }

    /// Delete every token issued to `user_id`. Returns the number removed.
    pub fn revoke_for_user(&self, user_id: u64) -> Result<usize, AuthError> {
        let removed = RefreshTokenRepository::new(&self.db).delete_for_user(user_id)?;
        if removed > 0 {
            info!(user_id, removed, "Refresh tokens revoked");
        }
        Ok(removed)
    }

    /// Delete every token expired at `now`. Returns the number removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, AuthError> {
        Ok(RefreshTokenRepository::new(&self.db).purge_expired(now)?)
    }

    fn generate_value(&self) -> Result<String, AuthError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AuthError::Internal("system random source unavailable".into()))?;
        Ok(Base64UrlUnpadded::encode_string(&bytes))
    }
}
