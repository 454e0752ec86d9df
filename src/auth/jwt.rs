//! JWT token issuance and verification

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::db::Role;
use crate::error::{Error, Result};

/// Claims carried by an access token: the user's identity and role.
/// Validity is determined solely by signature and expiry; no issuer or
/// audience claims are used.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// User id
    pub id: i64,
    /// Role at issuance time
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Claims carried by a refresh token. Deliberately carries no role: the
/// refresh endpoint re-reads the role from the store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// User id
    pub id: i64,
    /// Issued at
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

/// Signs and verifies both token kinds. Built once at startup from the auth
/// config; never reads the environment.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_minutes: config.access_ttl_minutes,
            refresh_ttl_days: config.refresh_ttl_days,
        }
    }

    /// Create a short-lived access token carrying `{id, role}`.
    pub fn issue_access(&self, user_id: i64, role: Role) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = AccessClaims {
            id: user_id,
            role,
            iat: now,
            exp: now + self.access_ttl_minutes * 60,
        };
        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| Error::Other(format!("Failed to sign access token: {}", e)))
    }

    /// Create a long-lived refresh token carrying `{id}`.
    pub fn issue_refresh(&self, user_id: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = RefreshClaims {
            id: user_id,
            iat: now,
            exp: now + self.refresh_ttl_days * 24 * 3600,
        };
        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| Error::Other(format!("Failed to sign refresh token: {}", e)))
    }

    /// Verify an access token's signature and expiry.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Forbidden("Invalid or expired access token"))
    }

    /// Verify a refresh token's signature and expiry.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Forbidden("Invalid Refresh Token"))
    }
}
