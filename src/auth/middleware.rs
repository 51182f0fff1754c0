// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token gate for protected routes.
//!
//! Applied with `axum::middleware::from_fn_with_state` as a route layer, so
//! a request without a valid access token is rejected with 401 before any
//! protected handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::bearer_token;
use crate::state::AppState;

/// Verify the bearer token and stash the authenticated user in request
/// extensions for the [`super::Auth`] extractor.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = bearer_token(request.headers()).and_then(|token| state.auth.verify(token));

    match verified {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                path = %request.uri().path(),
                error_code = e.error_code(),
                "Rejected unauthenticated request"
            );
            e.into_response()
        }
    }
}
