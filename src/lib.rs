// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! realm-gate - Token Verification & Request-Rate Governance Gateway
//!
//! This crate gates protected requests to a multi-tenant API: it verifies
//! Keycloak-issued bearer tokens against the realm's published JWKS,
//! derives a per-request authorization context from the verified claims,
//! and enforces a per-identity sliding-window request quota.
//!
//! ## Modules
//!
//! - `api` - HTTP routes and gate wiring (Axum)
//! - `auth` - key cache, token verification, gates
//! - `ratelimit` - sliding-window rate governor
//! - `config` - environment-driven configuration
//! - `state` - shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod ratelimit;
pub mod state;
