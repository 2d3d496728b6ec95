//! Bearer token issuance and verification
//!
//! Tokens are stateless HS256 JWTs signed with a process-wide secret. No
//! server-side session table exists; validity is determined purely by the
//! signature and the expiry claim at verification time.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;
use crate::models::Principal;

use super::credentials::CredentialStore;

/// JWT claims carried by issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal name
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Roles held by the subject at issuance
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Issues and verifies bearer tokens
///
/// The signing key is process-wide immutable state established at startup;
/// no rotation is in scope.
pub struct TokenService {
    secret: String,
    ttl: Duration,
    store: Arc<CredentialStore>,
    validation: Validation,
}

impl TokenService {
    /// Create a new token service
    ///
    /// `ttl_secs` bounds the lifetime of every issued token.
    pub fn new(secret: impl Into<String>, ttl_secs: u64, store: Arc<CredentialStore>) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_secs as i64),
            store,
            validation,
        }
    }

    /// Issue a token bound to a principal
    ///
    /// The token carries `sub = principal.name`, `iat = now` and
    /// `exp = now + TTL`. Issuance is stateless: nothing is stored.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: principal.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            roles: principal.roles.clone(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| TokenError::Malformed)
    }

    /// Verify a presented token and resolve its subject to a principal
    pub fn verify(&self, token_text: &str) -> Result<Principal, TokenError> {
        let data = decode::<Claims>(
            token_text,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed,
        })?;

        self.store
            .lookup(&data.claims.sub)
            .cloned()
            .ok_or(TokenError::UnknownSubject)
    }
}
