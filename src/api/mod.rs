// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware, AuthContext},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.clone());

    // Optional-auth routes: a valid token attaches context, anything else
    // continues anonymously. Rate-limited by subject or peer address.
    let optional = Router::new()
        .route("/auth/status", get(auth::status))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::optional_auth))
        .with_state(state.clone());

    // Required-auth routes: the gate runs first, so the rate limit keys by
    // the verified subject.
    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/keys/refresh", post(admin::refresh_keys))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn(middleware::require_admin))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    let v1 = Router::new()
        .merge(optional)
        .merge(protected)
        .nest("/admin", admin);

    Router::new()
        .merge(public)
        .nest("/v1", v1)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::ready,
        auth::me,
        auth::status,
        admin::refresh_keys
    ),
    components(schemas(
        health::HealthResponse,
        health::ReadyResponse,
        health::ReadyChecks,
        auth::AuthStatusResponse,
        admin::RefreshKeysResponse,
        AuthContext
    )),
    modifiers(&SecurityAddon),
    info(
        title = "realm-gate",
        description = "Token verification and request-rate governance gateway"
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
