// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Refresh Token Sweeper
//!
//! Background task that periodically deletes expired refresh tokens.
//! Lookups already revoke an expired token when they meet it; tokens that
//! are never presented again would otherwise stay in the store forever.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::RefreshTokenService;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct RefreshTokenSweeper {
    refresh_tokens: RefreshTokenService,
    interval: Duration,
}

impl RefreshTokenSweeper {
    pub fn new(refresh_tokens: RefreshTokenService) -> Self {
        Self {
            refresh_tokens,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Refresh token sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Refresh token sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    /// Delete every token expired as of now. Returns the number removed.
    pub fn sweep_step(&self) -> usize {
        match self.refresh_tokens.purge_expired(Utc::now()) {
            Ok(0) => {
                debug!("Refresh token sweep: nothing expired");
                0
            }
            Ok(removed) => {
                info!(removed, "Refresh token sweep: purged expired tokens");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Refresh token sweep failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{DatabaseDirectory, Role};
    use crate::storage::{Database, NewUser, UserRepository};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn service(ttl: chrono::Duration) -> RefreshTokenService {
        let db = Arc::new(Database::in_memory().unwrap());
        UserRepository::new(&db)
            .insert(NewUser {
                username: "testUser".into(),
                password_hash: "hash".into(),
                roles: BTreeSet::from([Role::User]),
            })
            .unwrap();
        let directory = Arc::new(DatabaseDirectory::new(db.clone()));
        RefreshTokenService::new(db, directory, ttl)
    }

    #[test]
    fn sweep_step_removes_only_expired_tokens() {
        let expired = service(chrono::Duration::seconds(-5));
        let stale = expired.create("testUser").unwrap();
        let sweeper = RefreshTokenSweeper::new(expired.clone());
        assert_eq!(sweeper.sweep_step(), 1);
        assert!(expired.find_by_token(&stale.token).unwrap().is_none());

        let live = service(chrono::Duration::minutes(10));
        let fresh = live.create("testUser").unwrap();
        let sweeper = RefreshTokenSweeper::new(live.clone());
        assert_eq!(sweeper.sweep_step(), 0);
        assert!(live.find_by_token(&fresh.token).unwrap().is_some());
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let sweeper =
            RefreshTokenSweeper::new(service(chrono::Duration::minutes(10))).with_interval(Duration::from_secs(3600));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(sweeper.run(shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper exits promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn run_sweeps_each_interval() {
        let refresh = service(chrono::Duration::seconds(-5));
        let token = refresh.create("testUser").unwrap();
        let sweeper = RefreshTokenSweeper::new(refresh.clone()).with_interval(Duration::from_millis(20));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(sweeper.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(refresh.find_by_token(&token.token).unwrap().is_none());

        shutdown.cancel();
        handle.await.unwrap();
    }
}
