// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for a single-realm user store.
//!
//! ## Token Lifecycle
//!
//! 1. Client posts username and password to `/api/v1/login`
//! 2. Credentials are checked against the user directory (argon2 hashes)
//! 3. Server returns:
//!    - a short-lived HS256 access token (`sub` = username)
//!    - an opaque refresh token persisted with its own expiry
//! 4. Client sends `Authorization: Bearer <access token>` on protected calls
//! 5. When the access token lapses, the client posts the refresh token to
//!    `/api/v1/refreshToken` and receives a new access token; the refresh
//!    token is not rotated
//!
//! ## Security
//!
//! - Access token expiry is a hard boundary, no clock-skew leeway
//! - An expired refresh token is deleted the moment it is checked
//! - The signing key is fixed at startup

pub mod claims;
pub mod codec;
pub mod directory;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod roles;
pub mod service;

pub use claims::{AuthenticatedUser, Claims};
pub use codec::{AccessToken, TokenCodec};
pub use directory::{CredentialVerifier, CurrentPrincipal, DatabaseDirectory, Principal, UserDirectory};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{hash_password, verify_password, PasswordVerifierService};
pub use refresh::RefreshTokenService;
pub use roles::Role;
pub use service::{AuthService, IssuedTokens, RefreshedAccess};
