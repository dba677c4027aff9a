// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only operational endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Result of an explicit signing-key refresh.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshKeysResponse {
    /// Keys in the snapshot after the refresh.
    pub key_count: usize,
    pub timestamp: String,
}

#[derive(Serialize)]
struct RefreshErrorBody {
    error: String,
    error_code: String,
}

/// Force a signing-key refresh.
///
/// Goes through the same throttled refresh as cache misses: inside the
/// cool-down window this is a successful no-op, so a freshly rotated
/// provider key may stay unknown until the window lapses.
#[utoipa::path(
    post,
    path = "/v1/admin/keys/refresh",
    responses(
        (status = 200, description = "Key set refreshed (or cool-down no-op)", body = RefreshKeysResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller is not an admin"),
        (status = 502, description = "Identity provider unreachable"),
    ),
    security(("bearer" = []))
)]
pub async fn refresh_keys(State(state): State<AppState>) -> Response {
    match state.verifier.key_cache().refresh().await {
        Ok(()) => {
            let key_count = state.verifier.key_cache().key_count().await;
            tracing::info!(key_count, "explicit signing-key refresh");
            (
                StatusCode::OK,
                Json(RefreshKeysResponse {
                    key_count,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                }),
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "explicit signing-key refresh failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(RefreshErrorBody {
                    error: "Identity provider key refresh failed".to_string(),
                    error_code: "key_refresh_failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}
