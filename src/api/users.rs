// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints.
//!
//! `POST /api/v1/save` is public so that accounts can be registered, but
//! replacing an existing user needs a bearer token belonging to that user or
//! to an admin. Every other endpoint here sits behind the bearer token gate.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use tracing::info;

use crate::{
    auth::{extractor::bearer_token, hash_password, Auth, AuthenticatedUser, Role},
    error::ApiError,
    models::{UserRequest, UserResponse},
    state::AppState,
    storage::{NewUser, StoredUser, UserRepository},
};

#[utoipa::path(
    post,
    path = "/api/v1/save",
    request_body = UserRequest,
    tag = "Users",
    security((), ("bearer" = [])),
    responses(
        (status = 200, description = "Created or updated user", body = UserResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Update without a valid bearer token"),
        (status = 403, description = "Update of another user by a non-admin"),
        (status = 404, description = "No user with the given id"),
        (status = 409, description = "Username already taken"),
    )
)]
pub async fn save_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<UserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let caller = match request.id {
        Some(_) => Some(state.auth.verify(bearer_token(&headers)?)?),
        None => None,
    };
    // Password hashing is CPU-bound
    let user = tokio::task::spawn_blocking(move || {
        save_user_record(&state, caller.as_ref(), request)
    })
    .await
    .map_err(|e| ApiError::internal(format!("save task failed: {e}")))??;
    Ok(Json(user))
}

/// Create a user, or replace the one named by `request.id`.
///
/// Replacing a user is limited to that user and to admins, and revokes the
/// user's refresh tokens.
pub fn save_user_record(
    state: &AppState,
    caller: Option<&AuthenticatedUser>,
    request: UserRequest,
) -> Result<UserResponse, ApiError> {
    let username = request
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter username is not found in request"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parameter password is not found in request"))?;

    let roles: BTreeSet<Role> = match request.roles {
        Some(roles) if !roles.is_empty() => roles.into_iter().map(|r| r.name).collect(),
        _ => BTreeSet::from([Role::User]),
    };
    let password_hash = hash_password(&password)?;
    let repo = UserRepository::new(&state.db);

    let saved = match request.id {
        Some(id) => {
            authorize_update(state, caller, id)?;
            let existing = repo
                .get(id)?
                .ok_or_else(|| ApiError::not_found(format!("User not found with id: {id}")))?;
            let updated = repo.update(&StoredUser {
                username,
                password_hash,
                roles,
                ..existing
            })?;
            state.auth.refresh_tokens().revoke_for_user(updated.id)?;
            info!(user_id = updated.id, "User updated");
            updated
        }
        None => {
            let created = repo.insert(NewUser {
                username,
                password_hash,
                roles,
            })?;
            info!(user_id = created.id, "User created");
            created
        }
    };

    Ok(saved.into())
}

fn authorize_update(
    state: &AppState,
    caller: Option<&AuthenticatedUser>,
    id: u64,
) -> Result<(), ApiError> {
    let caller = caller.ok_or(crate::auth::AuthError::MissingAuthHeader)?;
    let current = state.directory.resolve_current(caller)?;
    if current.id == id || current.roles.contains(&Role::Admin) {
        return Ok(());
    }
    Err(ApiError::forbidden(format!("Not allowed to update user with id: {id}")))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [UserResponse]),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = UserRepository::new(&state.db).list()?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Profile of the caller identified by the bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Token subject no longer exists"),
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let stored = state.directory.resolve_current(&user)?;
    Ok(Json(stored.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/user/{id}",
    params(("id" = u64, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = UserRepository::new(&state.db)
        .get(id)?
        .ok_or_else(|| ApiError::not_found(format!("User not found with id: {id}")))?;
    Ok(Json(user.into()))
}

/// Delete a user together with all of their refresh tokens.
#[utoipa::path(
    delete,
    path = "/api/v1/delete/{id}",
    params(("id" = u64, Path, description = "User id")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Id of the deleted user", body = u64),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn delete_user(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<u64>, ApiError> {
    let removed = UserRepository::new(&state.db).delete(id)?;
    state.auth.refresh_tokens().revoke_for_user(removed.id)?;
    info!(user_id = removed.id, "User deleted");
    Ok(Json(removed.id))
}

/// Create an admin account unless the username is already taken.
///
/// Returns whether a user was created.
pub fn ensure_admin(state: &AppState, username: &str, password: &str) -> Result<bool, ApiError> {
    let repo = UserRepository::new(&state.db);
    if repo.find_by_username(username)?.is_some() {
        return Ok(false);
    }

    let created = repo.insert(NewUser {
        username: username.to_string(),
        password_hash: hash_password(password)?,
        roles: BTreeSet::from([Role::Admin, Role::User]),
    })?;
    info!(user_id = created.id, "Seeded admin user");
    Ok(true)
}
