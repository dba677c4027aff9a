// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::ratelimit::RateLimiter;

/// Shared process-wide state: the token verifier (owning the signing-key
/// cache) and the rate governor. Passed by reference to the components that
/// need them; lifecycle is tied to process start/stop.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<TokenVerifier>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            verifier: Arc::new(TokenVerifier::new(
                &config.keycloak_url,
                &config.keycloak_realm,
                config.jwks_url.clone(),
            )),
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit,
                Duration::from_secs(config.rate_window_secs),
            )),
        }
    }
}
