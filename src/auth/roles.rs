// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Roles a user record can carry.
///
/// Declaration order is the sort order, so role sets render admin first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema,
)]
pub enum Role {
    /// Administrative user
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    /// Regular user
    #[serde(rename = "ROLE_USER")]
    User,
}

impl Role {
    /// Parse a role name, with or without the `ROLE_` prefix (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(upper.as_str()) {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::User => "ROLE_USER",
        }
    }
}

impl Default for Role {
    /// Default role is User (least privilege).
    fn default() -> Self {
        Role::User
    }
}

/// Accepts any spelling [`Role::parse`] understands.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Role::parse(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown role `{name}`")))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
