//! Database migrations for identity-gate
//!
//! This module contains SQL migrations for the SQLite database schema.

/// SQL statement to create the initial database schema
///
/// The unique indexes on username and email are the authoritative guard for
/// the identity-uniqueness invariant; the registry's in-process checks are a
/// fast path with better error messages.
pub const CREATE_SCHEMA: &str = r#"
-- Registered users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
"#;

/// Get the migration version
pub fn migration_version() -> i32 {
    1
}
