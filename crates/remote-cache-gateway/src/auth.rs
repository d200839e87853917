//! Team token authentication
//!
//! Turns an `Authorization` header into a trusted [`TenantId`]. Every failure
//! collapses into [`Unauthorized`] so callers cannot tell which check failed.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;

/// Prefix every team identifier carries
pub const TEAM_PREFIX: &str = "team_";

/// Opaque authentication failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

impl fmt::Display for Unauthorized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Unauthorized")
    }
}

impl std::error::Error for Unauthorized {}

/// Verified team identifier (`team_` followed by word characters)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    /// Validate a raw claim value. Only the authenticator builds tenants from
    /// request input; this stays crate-private.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let rest = raw.strip_prefix(TEAM_PREFIX)?;
        let valid = !rest.is_empty()
            && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key for an artifact owned by this team: `<teamId>/<hash>`
    pub fn object_key(&self, hash: &str) -> String {
        format!("{}/{}", self.0, hash)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims a team token must carry
#[derive(Debug, Deserialize)]
struct TeamClaims {
    #[serde(rename = "teamId")]
    team_id: String,
}

/// Verifies HMAC-signed team tokens against the shared secret
#[derive(Clone)]
pub struct TokenAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenAuthenticator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp is checked when present but not mandatory
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Authenticate an `Authorization` header value.
    ///
    /// A leading `Bearer ` is stripped; without it the whole value is verified.
    pub fn authenticate(&self, authorization: &str) -> Result<TenantId, Unauthorized> {
        let token = extract_bearer_token(authorization);

        let claims = decode::<TeamClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                Unauthorized
            })?;

        TenantId::parse(&claims.team_id).ok_or_else(|| {
            tracing::debug!("Token carries an invalid teamId claim");
            Unauthorized
        })
    }
}

/// Strip the `Bearer ` scheme if present
pub fn extract_bearer_token(auth_header: &str) -> &str {
    auth_header.strip_prefix("Bearer ").unwrap_or(auth_header)
}
