//! Principal and access-decision models
//!
//! A principal is a statically configured identity allowed to authenticate.
//! It is distinct from a registered [`User`](crate::models::User) business
//! record: principals exist for the process lifetime and are never mutated.

use serde::{Deserialize, Serialize};

/// A configured identity allowed to authenticate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique, case-sensitive name
    pub name: String,

    /// Argon2id hash of the principal's secret (PHC format).
    /// Never serialized into responses.
    #[serde(skip_serializing)]
    pub secret_hash: String,

    /// Roles granted to this principal
    pub roles: Vec<String>,
}

impl Principal {
    /// Create a new principal
    pub fn new(name: impl Into<String>, secret_hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secret_hash: secret_hash.into(),
            roles: Vec::new(),
        }
    }

    /// Set roles
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    /// Check whether this principal carries a role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Why a request was denied
///
/// Kept internal for logging; the HTTP edge surfaces a uniform 401 body
/// regardless of the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Basic credentials failed verification
    InvalidCredentials,

    /// Bearer token failed verification
    InvalidToken,

    /// Protected request carried no credentials
    NoCredentials,

    /// Authorization header carried an unrecognized scheme
    UnsupportedScheme,
}

/// The outcome of gating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Request may proceed. `None` means an anonymous request on a public
    /// route; `Some` carries the authenticated principal downstream.
    Allow(Option<Principal>),

    /// Request is rejected
    Deny(DenyReason),
}

impl AccessDecision {
    /// True if the decision lets the request proceed
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow(_))
    }

    /// The authenticated principal, if any
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            AccessDecision::Allow(p) => p.as_ref(),
            AccessDecision::Deny(_) => None,
        }
    }
}
