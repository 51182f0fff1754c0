// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Field names follow the
//! wire contract existing clients use (`accessToken`, `refreshToken`,
//! `token`), hence the camelCase renames.
//!
//! ## Model Categories
//!
//! - **Session**: login and refresh exchanges
//! - **Users**: account create/update and the public user view

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::StoredUser;

// =============================================================================
// Session Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "testUser")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JwtResponse {
    /// Signed access token for the `Authorization: Bearer` header
    pub access_token: String,
    /// Refresh token value (unchanged across refreshes)
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// Refresh token value obtained at login
    #[serde(alias = "token")]
    pub refresh_token: String,
}

// =============================================================================
// User Models
// =============================================================================

/// A role as exposed over the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoleView {
    pub name: Role,
}

/// Create or update a user.
///
/// Without `id` a new user is created; with `id` that user is replaced.
/// `username` and `password` are optional in the schema so that a missing
/// field yields a descriptive 400 instead of a generic rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserRequest {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Defaults to `[{"name": "ROLE_USER"}]`
    #[serde(default)]
    pub roles: Option<Vec<RoleView>>,
}

/// User as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub roles: Vec<RoleView>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            // BTreeSet iteration is already sorted
            roles: user.roles.into_iter().map(|name| RoleView { name }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    #[test]
    fn jwt_response_uses_wire_names() {
        let response = JwtResponse {
            access_token: "abc".into(),
            token: "def".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"accessToken": "abc", "token": "def"}));
    }

    #[test]
    fn refresh_request_accepts_both_field_names() {
        let a: RefreshTokenRequest = serde_json::from_str(r#"{"refreshToken":"v1"}"#).unwrap();
        let b: RefreshTokenRequest = serde_json::from_str(r#"{"token":"v2"}"#).unwrap();
        assert_eq!(a.refresh_token, "v1");
        assert_eq!(b.refresh_token, "v2");
    }

    #[test]
    fn user_request_fields_are_optional() {
        let request: UserRequest = serde_json::from_str("{}").unwrap();
        assert!(request.id.is_none());
        assert!(request.username.is_none());

        let request: UserRequest = serde_json::from_str(
            r#"{"username":"a","password":"b","roles":[{"name":"ROLE_ADMIN"}]}"#,
        )
        .unwrap();
        assert_eq!(request.roles.unwrap()[0].name, Role::Admin);
    }

    #[test]
    fn user_response_hides_hash_and_sorts_roles() {
        let user = StoredUser {
            id: 7,
            username: "testUser".into(),
            password_hash: "$argon2id$secret".into(),
            roles: BTreeSet::from([Role::User, Role::Admin]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "username": "testUser",
                "roles": [{"name": "ROLE_ADMIN"}, {"name": "ROLE_USER"}]
            })
        );
    }
}
