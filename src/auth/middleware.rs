// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request gates: authentication, optional authentication, admin, and rate
//! limiting middleware for Axum.
//!
//! The authentication gate verifies the bearer token and inserts an
//! [`AuthContext`] into the request extensions; downstream gates and
//! handlers read it from there. Validator failures are logged with their
//! internal reason and returned to the caller as a generic 401; key
//! material and provider fetch details never leak.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::AuthContext;
use super::error::AuthError;
use crate::state::AppState;

/// Rate-limit key used when neither an identity nor a peer address is known.
const ANONYMOUS_KEY: &str = "unknown";

/// Extract the token from an `Authorization: Bearer <token>` value. The
/// scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let mut parts = value.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MalformedAuthHeader);
    }
    Ok(token)
}

/// Required-auth gate: rejects requests without a valid bearer token and
/// attaches the derived [`AuthContext`] on success.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return AuthError::MissingAuthHeader.into_response(),
    };

    let value = match header.to_str() {
        Ok(value) => value,
        Err(_) => return AuthError::MalformedAuthHeader.into_response(),
    };

    let token = match bearer_token(value) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    match state.verifier.verify(token).await {
        Ok(claims) => {
            request
                .extensions_mut()
                .insert(AuthContext::from_claims(&claims));
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(error = %err, "rejecting bearer token");
            err.into_response()
        }
    }
}

/// Optional-auth gate: attaches an [`AuthContext`] when a valid token is
/// present, continues anonymously otherwise.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| bearer_token(value).ok());

    if let Some(token) = token {
        match state.verifier.verify(token).await {
            Ok(claims) => {
                request
                    .extensions_mut()
                    .insert(AuthContext::from_claims(&claims));
            }
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid token on optional route");
            }
        }
    }

    next.run(request).await
}

/// Admin gate. Must run after [`require_auth`] has populated the context;
/// an absent context is treated as unauthenticated, never as admin.
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthContext>() {
        None => AuthError::MissingAuthHeader.into_response(),
        Some(ctx) if !ctx.is_admin => AuthError::Forbidden.into_response(),
        Some(_) => next.run(request).await,
    }
}

/// Rate-limit gate. Keys by the verified subject when an [`AuthContext`] is
/// present, else by the peer address, so authenticated traffic is governed
/// per identity rather than per address.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .extensions()
        .get::<AuthContext>()
        .map(|ctx| ctx.subject.clone())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_else(|| ANONYMOUS_KEY.to_string());

    if !state.limiter.allow(&key) {
        tracing::warn!(key = %key, "rate limit exceeded");
        return AuthError::RateLimited.into_response();
    }

    next.run(request).await
}
