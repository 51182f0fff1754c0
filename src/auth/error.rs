// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Authentication error type.
///
/// Every failure of the token lifecycle surfaces as one of these and is
/// mapped to a status code only at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// No authenticated identity bound to the call
    #[error("Authentication is required")]
    Unauthenticated,
    /// Username/password pair did not verify
    #[error("Invalid username or password")]
    BadCredentials,
    /// Access token malformed, wrongly signed or expired; or refresh token unknown
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    /// Refresh token past its expiry; the record has already been deleted
    #[error("{0} Refresh token is expired. Please make a new login")]
    RefreshTokenExpired(String),
    /// Referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),
    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Internal error
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::BadCredentials => "bad_credentials",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::RefreshTokenExpired(_) => "refresh_token_expired",
            AuthError::UserNotFound(_) => "user_not_found",
            AuthError::Storage(_) => "storage_error",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::Unauthenticated
            | AuthError::BadCredentials
            | AuthError::InvalidToken(_)
            | AuthError::RefreshTokenExpired(_) => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Storage(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication failed with internal error");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
