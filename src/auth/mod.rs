// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Keycloak bearer-token verification for protected routes.
//!
//! ## Auth Flow
//!
//! 1. Client obtains an access token from the realm and sends
//!    `Authorization: Bearer <token>`
//! 2. The gate:
//!    - Resolves the token's `kid` against the cached realm JWKS
//!      (fetching on miss, throttled by a 5-minute cool-down)
//!    - Verifies signature, expiry, and issuer
//!    - Derives an [`AuthContext`] (identity, roles, admin flag) and
//!      attaches it to the request
//!
//! ## Security
//!
//! - Only RSA-family signing algorithms are accepted; HS*/none are
//!   hard-rejected before any key lookup
//! - Token failures return one generic 401 body; the detailed reason is
//!   logged server-side only
//! - The admin gate treats an absent context as not-admin

pub mod claims;
pub mod error;
pub mod jwks;
pub mod middleware;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testkeys;

pub use claims::{AuthContext, RealmClaims};
pub use error::AuthError;
pub use jwks::KeyCache;
pub use verifier::TokenVerifier;
