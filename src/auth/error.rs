// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and gating errors.
//!
//! Every failure this core can produce is a variant here, from key-material
//! decoding up to the request gates. The `Display` text is the *internal*
//! reason and goes to the server logs only; the HTTP response body for
//! token-class failures is a single generic message so key material and
//! provider fetch details never reach the caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error taxonomy.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A JWKS entry's `n`/`e` components are not valid unpadded Base64url,
    /// or decode to a non-positive integer.
    #[error("malformed key material (invalid base64url RSA components)")]
    MalformedKey,
    /// A JWKS entry declares a key type other than RSA.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),
    /// The JWKS endpoint could not be fetched or parsed.
    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(String),
    /// No published signing key matches the token's key id, even after a
    /// forced refresh.
    #[error("no signing key matches the token key id")]
    UnknownKey,
    /// The token is not a well-formed signed JWT.
    #[error("token is malformed")]
    MalformedToken,
    /// The token's signing algorithm is not RSA-based (HS*/none are
    /// hard-rejected before any key lookup).
    #[error("token signing algorithm is not RSA-based")]
    UnsupportedAlgorithm,
    /// The signature does not verify against the resolved key.
    #[error("token signature is invalid")]
    SignatureInvalid,
    /// The `iss` claim does not equal the configured realm issuer.
    #[error("token issuer does not match the configured realm")]
    IssuerMismatch,
    /// The token's `exp` has passed.
    #[error("token has expired")]
    TokenExpired,
    /// The payload verified but could not be decoded into the expected
    /// claims structure.
    #[error("token claims could not be decoded")]
    ClaimsDecode,
    /// No `Authorization` header on the request.
    #[error("authorization header is required")]
    MissingAuthHeader,
    /// The `Authorization` header is not of the form `Bearer <token>`.
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    MalformedAuthHeader,
    /// The authenticated identity lacks the admin role.
    #[error("admin access required")]
    Forbidden,
    /// The identity (or address) exceeded its request quota.
    #[error("rate limit exceeded")]
    RateLimited,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Machine-readable code, as exposed to the client.
    ///
    /// Token-class failures all collapse to `unauthenticated`; the split
    /// between e.g. a bad signature and an unknown key is diagnostic detail
    /// that stays server-side.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::MalformedAuthHeader => "invalid_auth_header",
            AuthError::Forbidden => "forbidden",
            AuthError::RateLimited => "rate_limited",
            _ => "unauthenticated",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message returned to the caller.
    ///
    /// Header-shape, forbidden, and rate-limit rejections are self-evident
    /// to the caller and keep their text; everything else is generic.
    fn client_message(&self) -> String {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MalformedAuthHeader
            | AuthError::Forbidden
            | AuthError::RateLimited => self.to_string(),
            _ => "Invalid or expired credentials".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.client_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let response = AuthError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rate_limited_returns_429() {
        let response = AuthError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn token_failures_collapse_to_generic_body() {
        for err in [
            AuthError::SignatureInvalid,
            AuthError::TokenExpired,
            AuthError::UnknownKey,
            AuthError::KeyFetch("connection refused".to_string()),
            AuthError::IssuerMismatch,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            assert_eq!(body["error_code"], "unauthenticated");
            assert_eq!(body["error"], "Invalid or expired credentials");
        }
    }

    #[test]
    fn internal_display_keeps_detail() {
        let err = AuthError::KeyFetch("HTTP 503 from JWKS endpoint".to_string());
        assert!(err.to_string().contains("HTTP 503"));
    }
}
