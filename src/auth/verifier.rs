// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the realm's signing keys.

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};

use super::claims::RealmClaims;
use super::error::AuthError;
use super::jwks::KeyCache;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies bearer tokens issued by one realm of the identity provider.
///
/// Holds the signing-key cache and the expected issuer, computed as
/// `{provider}/realms/{realm}`. Symmetric algorithms and `none` are never
/// accepted; the algorithm is checked against the RSA family before any
/// key lookup.
pub struct TokenVerifier {
    keys: KeyCache,
    issuer: String,
}

impl TokenVerifier {
    /// Create a verifier for the given provider base URL and realm. The
    /// JWKS endpoint derives from the same pair unless explicitly
    /// overridden.
    pub fn new(provider_url: &str, realm: &str, jwks_url_override: Option<String>) -> Self {
        let provider_url = provider_url.trim_end_matches('/');
        let jwks_url = jwks_url_override.unwrap_or_else(|| {
            format!("{provider_url}/realms/{realm}/protocol/openid-connect/certs")
        });

        Self {
            keys: KeyCache::new(jwks_url),
            issuer: format!("{provider_url}/realms/{realm}"),
        }
    }

    /// The expected `iss` claim value.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The signing-key cache (exposed for the admin refresh endpoint and
    /// readiness checks).
    pub fn key_cache(&self) -> &KeyCache {
        &self.keys
    }

    /// Verify a bearer token and return its typed claims.
    ///
    /// Checks, in order: token structure, RSA-family algorithm, key id
    /// resolution through the cache (refreshing on miss), signature,
    /// expiry (token-encoded `exp` against current time, 60 s leeway),
    /// issuer, and claims shape.
    pub async fn verify(&self, token: &str) -> Result<RealmClaims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        let algorithm = match header.alg {
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => header.alg,
            _ => return Err(AuthError::UnsupportedAlgorithm),
        };

        // The provider publishes a kid with every key; a token without one
        // cannot have been minted against this realm.
        let kid = header.kid.ok_or(AuthError::MalformedToken)?;

        let key = self.keys.get(&kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        // Audience intentionally not validated; Keycloak's aud varies by
        // client mapper configuration.
        validation.validate_aud = false;

        let token_data =
            decode::<RealmClaims>(token, &key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimsDecode,
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }
}
