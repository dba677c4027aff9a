// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    /// Individual checks and their results.
    pub checks: ReadyChecks,
    /// Current timestamp.
    pub timestamp: String,
}

/// Individual readiness check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Signing-key cache status: "ok" once keys are cached, "empty" until
    /// the first successful refresh.
    pub signing_keys: String,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe.
///
/// An empty signing-key cache is reported but not failing; the cache is
/// populated lazily on the first verification.
#[utoipa::path(
    get,
    path = "/ready",
    responses((status = 200, description = "Readiness report", body = ReadyResponse))
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let key_count = state.verifier.key_cache().key_count().await;
    let signing_keys = if key_count > 0 { "ok" } else { "empty" };

    let response = ReadyResponse {
        status: "ok".to_string(),
        checks: ReadyChecks {
            service: "ok".to_string(),
            signing_keys: signing_keys.to_string(),
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}
