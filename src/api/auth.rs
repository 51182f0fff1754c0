// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints: login and access token refresh.

use axum::{extract::State, Json};

use crate::{
    auth::AuthError,
    models::{JwtResponse, LoginRequest, RefreshTokenRequest},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    tag = "Session",
    responses(
        (status = 200, description = "Access and refresh tokens", body = JwtResponse),
        (status = 401, description = "Invalid username or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<JwtResponse>, AuthError> {
    let auth = state.auth.clone();
    // Argon2 verification is CPU-bound
    let issued = tokio::task::spawn_blocking(move || auth.login(&request.username, &request.password))
        .await
        .map_err(|e| AuthError::Internal(format!("login task failed: {e}")))??;

    Ok(Json(JwtResponse {
        access_token: issued.access_token.into_string(),
        token: issued.refresh_token.token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/refreshToken",
    request_body = RefreshTokenRequest,
    tag = "Session",
    responses(
        (status = 200, description = "New access token with the same refresh token", body = JwtResponse),
        (status = 401, description = "Refresh token unknown or expired"),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<JwtResponse>, AuthError> {
    let refreshed = state.auth.refresh(&request.refresh_token)?;

    Ok(Json(JwtResponse {
        access_token: refreshed.access_token.into_string(),
        token: refreshed.refresh_token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, Role};
    use crate::state::test_state;
    use crate::storage::{NewUser, UserRepository};
    use std::collections::BTreeSet;

    fn state_with_test_user() -> AppState {
        let state = test_state();
        UserRepository::new(&state.db)
            .insert(NewUser {
                username: "testUser".into(),
                password_hash: hash_password("password").unwrap(),
                roles: BTreeSet::from([Role::User]),
            })
            .unwrap();
        state
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn login_success() {
        let state = state_with_test_user();
        let Json(response) = login(State(state.clone()), Json(login_request("testUser", "password")))
            .await
            .expect("login succeeds");

        assert!(!response.access_token.is_empty());
        assert!(!response.token.is_empty());
        assert_eq!(
            state.auth.codec().verify(&response.access_token).unwrap(),
            "testUser"
        );
    }

    #[tokio::test]
    async fn login_with_wrong_password_fails() {
        let state = state_with_test_user();
        let result = login(State(state), Json(login_request("testUser", "nope"))).await;
        assert!(matches!(result, Err(AuthError::BadCredentials)));
    }

    #[tokio::test]
    async fn refresh_returns_same_refresh_token() {
        let state = state_with_test_user();
        let Json(session) = login(State(state.clone()), Json(login_request("testUser", "password")))
            .await
            .unwrap();

        let Json(refreshed) = refresh_token(
            State(state.clone()),
            Json(RefreshTokenRequest {
                refresh_token: session.token.clone(),
            }),
        )
        .await
        .expect("refresh succeeds");

        assert!(!refreshed.access_token.is_empty());
        assert_eq!(refreshed.token, session.token);
    }

    #[tokio::test]
    async fn refresh_with_unknown_token_is_unauthorized() {
        let state = state_with_test_user();
        let result = refresh_token(
            State(state),
            Json(RefreshTokenRequest {
                refresh_token: "never-issued".into(),
            }),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
