//! Identity token verification.
//!
//! Sign-in happens elsewhere: the identity provider issues HS256 tokens and
//! this service only verifies them. The token subject becomes the record
//! owner id. A caller is an admin when the token carries the `admin` role or
//! the subject is listed in `ADMIN_UIDS`.

use std::collections::HashSet;

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use memoir_core::defaults::JWT_SECRET_MIN_LEN;
use memoir_core::{Error, Principal, Result};

use crate::{ApiError, AppState};

/// Role claim value granting the admin surface.
pub const ADMIN_ROLE: &str = "admin";

/// Claims read from an identity token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user id from the identity provider.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// Verifies identity tokens and resolves them to a [`Principal`].
#[derive(Clone)]
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    admin_uids: HashSet<String>,
}

impl IdentityVerifier {
    /// Returns a `Config` error if the secret is shorter than the minimum.
    pub fn new(secret: &str, admin_uids: HashSet<String>) -> Result<Self> {
        if secret.len() < JWT_SECRET_MIN_LEN {
            return Err(Error::Config(format!(
                "AUTH_JWT_SECRET must be at least {} characters",
                JWT_SECRET_MIN_LEN
            )));
        }
        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            admin_uids,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            let msg = match err.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                ErrorKind::InvalidSignature => "Invalid signature",
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) => {
                    "Invalid token"
                }
                _ => "Token validation failed",
            };
            debug!(subsystem = "api", component = "auth", error = %err, "Token rejected");
            Error::Unauthorized(msg.to_string())
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(Error::Unauthorized("Token has no subject".to_string()));
        }

        let is_admin =
            claims.roles.iter().any(|r| r == ADMIN_ROLE) || self.admin_uids.contains(&claims.sub);
        Ok(Principal {
            uid: claims.sub,
            display_name: claims.name,
            is_admin,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires a verified identity token.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub principal: Principal,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
        let principal = state.verifier.verify(token)?;
        Ok(RequireAuth { principal })
    }
}

/// Extractor that requires a verified admin identity.
#[derive(Debug, Clone)]
pub struct RequireAdmin {
    pub principal: Principal,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth = RequireAuth::from_request_parts(parts, state).await?;
        if !auth.principal.is_admin {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(RequireAdmin {
            principal: auth.principal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    fn token(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(sub: &str, roles: &[&str], exp: u64) -> Claims {
        Claims {
            sub: sub.to_string(),
            name: Some("Ada".to_string()),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp,
            iat: None,
        }
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            IdentityVerifier::new("short", HashSet::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_valid_token_resolves_principal() {
        let verifier = IdentityVerifier::new(SECRET, HashSet::new()).unwrap();
        let principal = verifier
            .verify(&token(SECRET, &claims("u1", &[], now() + 600)))
            .unwrap();
        assert_eq!(principal.uid, "u1");
        assert_eq!(principal.display_name.as_deref(), Some("Ada"));
        assert!(!principal.is_admin);
    }

    #[test]
    fn test_admin_from_role_or_uid_list() {
        let verifier =
            IdentityVerifier::new(SECRET, HashSet::from(["boss".to_string()])).unwrap();
        let by_role = verifier
            .verify(&token(SECRET, &claims("u1", &["admin"], now() + 600)))
            .unwrap();
        assert!(by_role.is_admin);
        let by_uid = verifier
            .verify(&token(SECRET, &claims("boss", &[], now() + 600)))
            .unwrap();
        assert!(by_uid.is_admin);
    }

    #[test]
    fn test_wrong_secret_and_expired_rejected() {
        let verifier = IdentityVerifier::new(SECRET, HashSet::new()).unwrap();
        let forged = token(
            "ffffffffffffffffffffffffffffffff",
            &claims("u1", &["admin"], now() + 600),
        );
        assert!(matches!(verifier.verify(&forged), Err(Error::Unauthorized(_))));

        let expired = token(SECRET, &claims("u1", &[], now() - 3600));
        match verifier.verify(&expired) {
            Err(Error::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("expected expiry rejection, got {:?}", other),
        }

        assert!(matches!(verifier.verify("not-a-jwt"), Err(Error::Unauthorized(_))));
    }

    #[test]
    fn test_blank_subject_rejected() {
        let verifier = IdentityVerifier::new(SECRET, HashSet::new()).unwrap();
        let blank = token(SECRET, &claims(" ", &[], now() + 600));
        assert!(matches!(verifier.verify(&blank), Err(Error::Unauthorized(_))));
    }
}
