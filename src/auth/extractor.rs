// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Routes behind [`super::middleware::require_bearer`] get the user the
/// middleware already verified; elsewhere the bearer token is verified here.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_profile(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<UserResponse>, ApiError> {
///     // user.username is the token subject
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers)?;
        let user = state.auth.verify(token)?;

        Ok(Auth(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_state;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_scheme() {
        let state = test_state();
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc"] {
            let mut parts = parts_with_header(Some(value));
            let result = Auth::from_request_parts(&mut parts, &state).await;
            assert!(
                matches!(result, Err(AuthError::InvalidAuthHeader)),
                "header {value:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let state = test_state();
        let token = state.auth.codec().issue("testUser").unwrap();
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "testUser");
    }

    #[tokio::test]
    async fn auth_extractor_rejects_forged_token() {
        let state = test_state();
        let mut parts = parts_with_header(Some("Bearer aaa.bbb.ccc"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let state = test_state();
        let mut parts = parts_with_header(None);
        parts.extensions.insert(AuthenticatedUser {
            username: "from_middleware".to_string(),
            issued_at: 0,
            expires_at: 0,
        });

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "from_middleware");
    }
}
