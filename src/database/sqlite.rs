//! SQLite implementation of the UserRepository trait
//!
//! Uses rusqlite behind tokio-rusqlite for async access. All statements are
//! parameterized.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::migrations::CREATE_SCHEMA;
use super::UserRepository;
use crate::error::DbError;
use crate::models::{NewUser, User};

/// SQLite-backed user repository
pub struct SqliteUserRepository {
    conn: Connection,
}

impl SqliteUserRepository {
    /// Open a database connection and run migrations
    ///
    /// Use `:memory:` for an in-memory database or a file path for
    /// persistent storage.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).await?;

        conn.call(|conn| {
            conn.execute_batch(CREATE_SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Create a new in-memory repository (useful for testing)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::new(":memory:").await
    }
}

/// Surface unique-index violations as constraint errors so callers can map
/// them onto duplicate-identity failures.
fn map_sqlite_err(e: tokio_rusqlite::Error) -> DbError {
    match e {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(err, Some(msg)))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::Constraint(msg)
        }
        other => DbError::Pool(other),
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
    })
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, candidate: &NewUser) -> Result<User, DbError> {
        let username = candidate.username.clone();
        let name = candidate.name.clone();
        let email = candidate.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (username, name, email) VALUES (?1, ?2, ?3)",
                    rusqlite::params![username, name, email],
                )?;
                let id = conn.last_insert_rowid();
                Ok(User {
                    id,
                    username,
                    name,
                    email,
                })
            })
            .await
            .map_err(map_sqlite_err)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT id, username, name, email FROM users WHERE id = ?1")?;
                let result = stmt.query_row([id], |row| row_to_user(row)).optional()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let username = username.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare("SELECT id, username, name, email FROM users WHERE username = ?1")?;
                let result = stmt
                    .query_row([&username], |row| row_to_user(row))
                    .optional()?;
                Ok(result)
            })
            .await
            .map_err(Into::into)
    }

    async fn count_by_username(&self, username: &str) -> Result<u64, DbError> {
        let username = username.to_string();

        self.conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM users WHERE username = ?1",
                    [&username],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Into::into)
    }

    async fn count_by_email(&self, email: &str) -> Result<u64, DbError> {
        let email = email.to_string();

        self.conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM users WHERE email = ?1",
                    [&email],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Into::into)
    }

    async fn list_all(&self) -> Result<Vec<User>, DbError> {
        self.conn
            .call(|conn| {
                let mut stmt =
                    conn.prepare("SELECT id, username, name, email FROM users ORDER BY id")?;
                let users = stmt
                    .query_map([], |row| row_to_user(row))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(users)
            })
            .await
            .map_err(Into::into)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.conn
            .call(|conn| {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(Into::into)
    }
}
