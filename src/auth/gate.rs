//! Per-request authentication gate
//!
//! Orchestrates one request: extracts credentials from the authorization
//! header, delegates to the credential store or the token service, consults
//! the access policy, and produces an allow/deny decision.

use std::sync::Arc;

use axum::http::Method;
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::models::{AccessDecision, DenyReason};

use super::credentials::CredentialStore;
use super::policy::{Access, AccessPolicy};
use super::token::TokenService;

/// Credentials extracted from an authorization header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialAttempt {
    /// Decoded Basic credentials
    Basic { username: String, password: String },

    /// Bearer token text
    Bearer(String),

    /// No authorization header present
    None,

    /// Basic header present but undecodable (bad base64, no colon)
    Malformed,

    /// A scheme other than Basic or Bearer
    Unsupported,
}

impl CredentialAttempt {
    /// Parse an authorization header value
    pub fn from_header(header: Option<&str>) -> Self {
        let Some(value) = header else {
            return CredentialAttempt::None;
        };

        if let Some(token) = value.strip_prefix("Bearer ") {
            return CredentialAttempt::Bearer(token.trim().to_string());
        }

        if let Some(encoded) = value.strip_prefix("Basic ") {
            let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
                return CredentialAttempt::Malformed;
            };
            let Ok(text) = String::from_utf8(decoded) else {
                return CredentialAttempt::Malformed;
            };
            return match text.split_once(':') {
                Some((username, password)) => CredentialAttempt::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                None => CredentialAttempt::Malformed,
            };
        }

        CredentialAttempt::Unsupported
    }
}

/// Gates every inbound request
///
/// Immutable after construction; shared across request handlers via `Arc`.
pub struct AuthenticationGate {
    credentials: Arc<CredentialStore>,
    tokens: Arc<TokenService>,
    policy: Arc<AccessPolicy>,
}

impl AuthenticationGate {
    /// Create a new gate
    pub fn new(
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            policy,
        }
    }

    /// Decide whether a request may proceed
    ///
    /// Presented Basic or Bearer credentials are always verified, even on
    /// public routes. Credential-less requests and unrecognized schemes
    /// fall through to the access policy: public routes allow them
    /// anonymously, protected routes deny them.
    pub fn authorize(
        &self,
        method: &Method,
        path: &str,
        authorization: Option<&str>,
    ) -> AccessDecision {
        match CredentialAttempt::from_header(authorization) {
            CredentialAttempt::Basic { username, password } => {
                if self.credentials.verify(&username, &password) {
                    match self.credentials.lookup(&username) {
                        Some(principal) => AccessDecision::Allow(Some(principal.clone())),
                        None => AccessDecision::Deny(DenyReason::InvalidCredentials),
                    }
                } else {
                    AccessDecision::Deny(DenyReason::InvalidCredentials)
                }
            }
            CredentialAttempt::Bearer(token) => match self.tokens.verify(&token) {
                Ok(principal) => AccessDecision::Allow(Some(principal)),
                Err(e) => {
                    tracing::debug!(error = %e, "Bearer token rejected");
                    AccessDecision::Deny(DenyReason::InvalidToken)
                }
            },
            CredentialAttempt::None => match self.policy.classify(method, path) {
                Access::Public => AccessDecision::Allow(None),
                Access::Protected => AccessDecision::Deny(DenyReason::NoCredentials),
            },
            CredentialAttempt::Malformed => AccessDecision::Deny(DenyReason::InvalidCredentials),
            // A foreign scheme is not an attempt against this service;
            // treat it like an anonymous request
            CredentialAttempt::Unsupported => match self.policy.classify(method, path) {
                Access::Public => AccessDecision::Allow(None),
                Access::Protected => AccessDecision::Deny(DenyReason::UnsupportedScheme),
            },
        }
    }
}
