// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `KEYCLOAK_URL` | Identity provider base URL | `http://localhost:8081` |
//! | `KEYCLOAK_REALM` | Realm whose tokens are accepted | `main` |
//! | `KEYCLOAK_CLIENT_ID` | Expected client identifier | empty |
//! | `JWKS_URL` | Explicit JWKS endpoint override | derived from URL + realm |
//! | `RATE_LIMIT` | Requests per identity per window | `100` |
//! | `RATE_WINDOW_SECS` | Rate-limit window in seconds | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;

use url::Url;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Identity provider base URL.
    pub keycloak_url: String,
    /// Realm whose tokens this service accepts.
    pub keycloak_realm: String,
    /// Expected client identifier. Kept for deployment parity and startup
    /// logging; the verifier does not validate audience.
    pub keycloak_client_id: String,
    /// Explicit JWKS endpoint override; when unset the endpoint derives
    /// from `keycloak_url` and `keycloak_realm`.
    pub jwks_url: Option<String>,
    pub rate_limit: usize,
    pub rate_window_secs: u64,
    /// `json` or `pretty`.
    pub log_format: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let keycloak_url = get_env("KEYCLOAK_URL", "http://localhost:8081");
        if Url::parse(&keycloak_url).is_err() {
            tracing::warn!(url = %keycloak_url, "KEYCLOAK_URL is not a valid URL");
        }

        Self {
            host: get_env("HOST", "0.0.0.0"),
            port: get_env("PORT", "8080").parse().unwrap_or(8080),
            keycloak_url,
            keycloak_realm: get_env("KEYCLOAK_REALM", "main"),
            keycloak_client_id: get_env("KEYCLOAK_CLIENT_ID", ""),
            jwks_url: env::var("JWKS_URL").ok().filter(|v| !v.is_empty()),
            rate_limit: get_env("RATE_LIMIT", "100").parse().unwrap_or(100),
            rate_window_secs: get_env("RATE_WINDOW_SECS", "60").parse().unwrap_or(60),
            log_format: get_env("LOG_FORMAT", "pretty"),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_env_falls_back_to_default() {
        assert_eq!(get_env("REALM_GATE_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
