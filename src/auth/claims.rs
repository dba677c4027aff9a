// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verified token claims and the derived authorization context.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims extracted from a verified realm token.
///
/// Keycloak access tokens carry the standard OIDC claims plus realm and
/// per-client role lists. `sub`, `iss`, `exp`, and `iat` are required, and
/// a token missing any of them fails claims decoding; everything else
/// defaults when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RealmClaims {
    /// Subject, the provider's canonical user identifier.
    pub sub: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub email_verified: bool,

    /// Full display name, when the provider has one.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub given_name: String,

    #[serde(default)]
    pub family_name: String,

    #[serde(default)]
    pub preferred_username: String,

    /// Realm-wide roles.
    #[serde(default)]
    pub realm_access: RealmAccess,

    /// Per-client roles, keyed by client id.
    #[serde(default)]
    pub resource_access: HashMap<String, RoleAccess>,

    /// Authorized party (the client the token was issued to).
    #[serde(default)]
    pub azp: Option<String>,

    pub iss: String,

    /// Audience; Keycloak emits either a string or an array, so this stays
    /// an opaque value. Not validated (see the verifier).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Issued-at (Unix seconds).
    pub iat: i64,
}

/// Realm-level role list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Client-level role list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RealmClaims {
    /// Whether the realm role list contains the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.realm_access.roles.iter().any(|r| r == role)
    }

    /// Admin means either the `admin` or the `realm-admin` realm role.
    pub fn is_admin(&self) -> bool {
        self.has_role("admin") || self.has_role("realm-admin")
    }

    /// Best display name available: the explicit name, then given plus
    /// family name, then the preferred username, then the email address.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        if !self.given_name.is_empty() && !self.family_name.is_empty() {
            return format!("{} {}", self.given_name, self.family_name);
        }
        if !self.preferred_username.is_empty() {
            return self.preferred_username.clone();
        }
        self.email.clone()
    }
}

/// Identity facts attached to a request after verification.
///
/// Derived deterministically from [`RealmClaims`]; downstream handlers read
/// it from the request extensions and never construct it themselves.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthContext {
    /// Always true for a context produced by the gate; present so
    /// downstream consumers can serialize the full auth state.
    pub verified: bool,
    /// Provider subject identifier.
    pub subject: String,
    pub email: String,
    pub display_name: String,
    /// Realm roles as carried by the token.
    pub roles: Vec<String>,
    pub is_admin: bool,
}

impl AuthContext {
    /// Derive the authorization context from verified claims. Pure: no
    /// I/O and no failure mode.
    pub fn from_claims(claims: &RealmClaims) -> Self {
        Self {
            verified: true,
            subject: claims.sub.clone(),
            email: claims.email.clone(),
            display_name: claims.display_name(),
            roles: claims.realm_access.roles.clone(),
            is_admin: claims.is_admin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> RealmClaims {
        serde_json::from_value(serde_json::json!({
            "sub": "user-123",
            "email": "a@x.com",
            "email_verified": true,
            "name": "",
            "given_name": "Ann",
            "family_name": "Lee",
            "preferred_username": "annlee",
            "realm_access": { "roles": ["user"] },
            "iss": "https://id.example.com/realms/main",
            "exp": 1700003600,
            "iat": 1700000000,
        }))
        .unwrap()
    }

    #[test]
    fn display_name_falls_back_through_given_family() {
        let claims = sample_claims();
        assert_eq!(claims.display_name(), "Ann Lee");
    }

    #[test]
    fn display_name_falls_back_to_preferred_username() {
        let mut claims = sample_claims();
        claims.given_name.clear();
        claims.family_name.clear();
        assert_eq!(claims.display_name(), "annlee");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut claims = sample_claims();
        claims.given_name.clear();
        claims.family_name.clear();
        claims.preferred_username.clear();
        assert_eq!(claims.display_name(), "a@x.com");
    }

    #[test]
    fn explicit_name_wins() {
        let mut claims = sample_claims();
        claims.name = "A. Lee".to_string();
        assert_eq!(claims.display_name(), "A. Lee");
    }

    #[test]
    fn given_name_alone_is_not_enough() {
        let mut claims = sample_claims();
        claims.family_name.clear();
        assert_eq!(claims.display_name(), "annlee");
    }

    #[test]
    fn user_role_is_not_admin() {
        let claims = sample_claims();
        assert!(!claims.is_admin());
    }

    #[test]
    fn realm_admin_role_is_admin() {
        let mut claims = sample_claims();
        claims.realm_access.roles = vec!["realm-admin".to_string()];
        assert!(claims.is_admin());
    }

    #[test]
    fn admin_role_is_admin() {
        let mut claims = sample_claims();
        claims.realm_access.roles.push("admin".to_string());
        assert!(claims.is_admin());
    }

    #[test]
    fn context_is_derived_from_claims() {
        let claims = sample_claims();
        let ctx = AuthContext::from_claims(&claims);
        assert!(ctx.verified);
        assert_eq!(ctx.subject, "user-123");
        assert_eq!(ctx.email, "a@x.com");
        assert_eq!(ctx.display_name, "Ann Lee");
        assert_eq!(ctx.roles, vec!["user".to_string()]);
        assert!(!ctx.is_admin);
    }

    #[test]
    fn missing_required_field_fails_decoding() {
        // No `sub` claim.
        let result: Result<RealmClaims, _> = serde_json::from_value(serde_json::json!({
            "iss": "https://id.example.com/realms/main",
            "exp": 1700003600,
            "iat": 1700000000,
        }));
        assert!(result.is_err());
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let claims: RealmClaims = serde_json::from_value(serde_json::json!({
            "sub": "user-9",
            "iss": "https://id.example.com/realms/main",
            "exp": 1700003600,
            "iat": 1700000000,
        }))
        .unwrap();
        assert!(claims.email.is_empty());
        assert!(!claims.email_verified);
        assert!(claims.realm_access.roles.is_empty());
        assert!(claims.resource_access.is_empty());
        assert_eq!(claims.display_name(), "");
    }

    #[test]
    fn audience_accepts_string_or_array() {
        for aud in [
            serde_json::json!("account"),
            serde_json::json!(["account", "gateway"]),
        ] {
            let claims: RealmClaims = serde_json::from_value(serde_json::json!({
                "sub": "user-9",
                "iss": "https://id.example.com/realms/main",
                "aud": aud,
                "exp": 1700003600,
                "iat": 1700000000,
            }))
            .unwrap();
            assert!(claims.aud.is_some());
        }
    }
}
