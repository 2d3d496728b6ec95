//! Persistence layer for identity-gate
//!
//! This module defines the user repository trait and its SQLite
//! implementation.

pub mod migrations;
pub mod sqlite;

pub use sqlite::SqliteUserRepository;

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{NewUser, User};

/// Repository contract the identity registry depends on
///
/// Any storage engine satisfying this contract is acceptable. Uses
/// `async_trait` for async methods and `mockall::automock` for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a candidate and return the stored record with its generated id
    async fn insert(&self, candidate: &NewUser) -> Result<User, DbError>;

    /// Look up a user by id
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    /// Look up a user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Count users with the given username
    async fn count_by_username(&self, username: &str) -> Result<u64, DbError>;

    /// Count users with the given email
    async fn count_by_email(&self, email: &str) -> Result<u64, DbError>;

    /// All users in creation order
    async fn list_all(&self) -> Result<Vec<User>, DbError>;

    /// Cheap connectivity probe
    async fn ping(&self) -> Result<(), DbError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: MockUserRepository insert
    #[tokio::test]
    async fn test_mock_repository_insert() {
        let mut mock = MockUserRepository::new();

        mock.expect_insert()
            .withf(|c| c.username == "john_doe")
            .returning(|c| Ok(User::new(1, &c.username, &c.name, &c.email)));

        let candidate = NewUser::new("john_doe", "John Doe", "john@example.com");
        let user = mock.insert(&candidate).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "john_doe");
    }

    // Test 2: MockUserRepository lookups
    #[tokio::test]
    async fn test_mock_repository_lookups() {
        let mut mock = MockUserRepository::new();

        mock.expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(User::new(1, "john_doe", "John Doe", "john@example.com"))));
        mock.expect_find_by_username()
            .withf(|u| u == "missing")
            .returning(|_| Ok(None));

        let found = mock.find_by_id(1).await.unwrap();
        assert_eq!(found.unwrap().username, "john_doe");

        let missing = mock.find_by_username("missing").await.unwrap();
        assert!(missing.is_none());
    }

    // Test 3: MockUserRepository counts and error propagation
    #[tokio::test]
    async fn test_mock_repository_counts_and_errors() {
        let mut mock = MockUserRepository::new();

        mock.expect_count_by_username().returning(|_| Ok(1));
        mock.expect_count_by_email()
            .returning(|_| Err(DbError::NotFound));

        assert_eq!(mock.count_by_username("john_doe").await.unwrap(), 1);
        assert!(mock.count_by_email("john@example.com").await.is_err());
    }
}
