//! Application error types for identity-gate
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Token verification errors
///
/// These variants are never surfaced individually to HTTP callers; the
/// gate collapses them into a single unauthorized response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token structure could not be parsed
    #[error("Malformed token")]
    Malformed,

    /// Token signature does not match the process key
    #[error("Bad token signature")]
    BadSignature,

    /// Token is past its expiry timestamp
    #[error("Token expired")]
    Expired,

    /// Token subject no longer resolves to a configured principal
    #[error("Unknown token subject")]
    UnknownSubject,
}

/// Authentication-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Invalid credentials for basic auth
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No credentials presented for a protected request
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header carried an unrecognized scheme
    #[error("Unsupported authentication scheme")]
    UnsupportedScheme,

    /// Bearer token verification failed
    #[error("Token rejected: {0}")]
    Token(#[from] TokenError),
}

/// Identity registry errors
///
/// Unlike auth errors, these ARE surfaced distinctly to API consumers so
/// they can correct their input.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Empty or malformed candidate field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Username already registered
    #[error("Username already exists")]
    DuplicateUsername,

    /// Email already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// User not found
    #[error("User not found")]
    NotFound,

    /// Storage backend failed during a write
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl IdentityError {
    /// Stable machine-readable code carried in error payloads
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::InvalidInput(_) => "invalid_input",
            IdentityError::DuplicateUsername => "duplicate_username",
            IdentityError::DuplicateEmail => "duplicate_email",
            IdentityError::NotFound => "not_found",
            IdentityError::Storage(_) => "storage_error",
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Async connection wrapper error
    #[error("Database error: {0}")]
    Pool(#[from] tokio_rusqlite::Error),

    /// Unique index violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Record not found
    #[error("Record not found")]
    NotFound,
}

/// Configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config: {0}")]
    FileRead(String),

    /// Failed to parse configuration content
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Configuration is structurally valid but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application-level error type
///
/// Aggregates all domain-specific error types at the binary boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Identity registry error
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
