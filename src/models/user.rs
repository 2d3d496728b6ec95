//! User-related domain models
//!
//! A user is a persisted business entity with globally unique username and
//! email. Callers always receive read-only snapshots; the authoritative copy
//! lives behind the identity registry.

use serde::{Deserialize, Serialize};

/// A registered identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Database-generated id, monotonically increasing
    pub id: i64,

    /// Globally unique username
    pub username: String,

    /// Human-readable display name
    pub name: String,

    /// Globally unique email address
    pub email: String,
}

impl User {
    /// Create a user record with a known id
    pub fn new(
        id: i64,
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Candidate user submitted for registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Login request body
///
/// Fields are optional so the handler can report missing fields with a 400
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}
