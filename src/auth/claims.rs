// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::directory::CurrentPrincipal;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the username the token was issued to
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds); the token is rejected from this second on
    pub exp: i64,
}

/// Authenticated user information extracted from a verified access token.
///
/// This is the request-scoped identity handed to protected handlers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Username (token `sub` claim)
    pub username: String,

    /// Token issue time (Unix timestamp)
    #[serde(skip)]
    pub issued_at: i64,

    /// Token expiration (Unix timestamp)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

impl CurrentPrincipal for AuthenticatedUser {
    fn current_username(&self) -> Option<&str> {
        Some(&self.username)
    }
}
