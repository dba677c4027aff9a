// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity endpoints: the demonstration consumers of the auth gates.

use axum::{extract::Request, Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthContext;

/// Authentication status as seen by an optional-auth route.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    /// Verified subject, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// The caller's verified authorization context.
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    responses(
        (status = 200, description = "Verified identity facts", body = AuthContext),
        (status = 401, description = "Missing or invalid credentials"),
    ),
    security(("bearer" = []))
)]
pub async fn me(Extension(ctx): Extension<AuthContext>) -> Json<AuthContext> {
    Json(ctx)
}

/// Authentication status; usable anonymously.
#[utoipa::path(
    get,
    path = "/v1/auth/status",
    responses((status = 200, description = "Authentication status", body = AuthStatusResponse))
)]
pub async fn status(request: Request) -> Json<AuthStatusResponse> {
    match request.extensions().get::<AuthContext>() {
        Some(ctx) => Json(AuthStatusResponse {
            authenticated: true,
            subject: Some(ctx.subject.clone()),
            display_name: Some(ctx.display_name.clone()),
        }),
        None => Json(AuthStatusResponse {
            authenticated: false,
            subject: None,
            display_name: None,
        }),
    }
}
