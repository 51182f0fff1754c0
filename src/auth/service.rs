// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and refresh orchestration.
//!
//! The service holds no state of its own between calls. A login verifies
//! credentials, then issues an access token and creates a refresh token for
//! the authenticated principal's username. A refresh validates the stored
//! refresh token and issues a new access token for its subject; the refresh
//! token itself is returned unchanged and stays valid until its own expiry.

use std::sync::Arc;

use tracing::{info, warn};

use super::claims::AuthenticatedUser;
use super::codec::{AccessToken, TokenCodec};
use super::directory::CredentialVerifier;
use super::error::AuthError;
use super::refresh::RefreshTokenService;
use crate::storage::RefreshToken;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub access_token: AccessToken,
    /// The refresh token value that was presented
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    codec: Arc<TokenCodec>,
    refresh_tokens: RefreshTokenService,
    credentials: Arc<dyn CredentialVerifier>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("codec", &self.codec)
            .field("refresh_tokens", &self.refresh_tokens)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        codec: Arc<TokenCodec>,
        refresh_tokens: RefreshTokenService,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Self {
        Self {
            codec,
            refresh_tokens,
            credentials,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn refresh_tokens(&self) -> &RefreshTokenService {
        &self.refresh_tokens
    }

    /// Verify credentials and issue an access token plus a new refresh token.
    ///
    /// Fails fast with [`AuthError::BadCredentials`]; nothing is issued or
    /// persisted on failure.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        let principal = match self.credentials.authenticate(username, password) {
            Ok(principal) => principal,
            Err(e) => {
                warn!(error_code = e.error_code(), "Login rejected");
                return Err(e);
            }
        };

        let access_token = self.codec.issue(&principal.username)?;
        let refresh_token = self.refresh_tokens.create(&principal.username)?;

        info!(user_id = principal.user_id, "Login succeeded");
        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token value for a new access token.
    ///
    /// An unknown value is [`AuthError::InvalidToken`]; an expired one is
    /// deleted and reported as [`AuthError::RefreshTokenExpired`].
    pub fn refresh(&self, value: &str) -> Result<RefreshedAccess, AuthError> {
        let token = self
            .refresh_tokens
            .find_by_token(value)?
            .ok_or_else(|| AuthError::InvalidToken("refresh token is not recognised".into()))?;

        let token = self.refresh_tokens.verify_expiration(token)?;
        let access_token = self.codec.issue(&token.subject)?;

        info!(user_id = token.user_id, "Access token refreshed");
        Ok(RefreshedAccess {
            access_token,
            refresh_token: token.token,
        })
    }

    /// Validate a bearer access token.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        self.codec.decode(token).map(AuthenticatedUser::from_claims)
    }
}
