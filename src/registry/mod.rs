//! Identity registry
//!
//! Owns user records and enforces global uniqueness of username and email at
//! creation time. All mutation funnels through one synchronized entry point;
//! the repository's unique indexes remain the authoritative backstop.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::Mutex;

use crate::database::UserRepository;
use crate::error::{DbError, IdentityError};
use crate::models::{NewUser, User};

/// Ephemeral ids are drawn from [1, 1_000_000)
const EPHEMERAL_ID_RANGE: std::ops::Range<i64> = 1..1_000_000;

/// Registry of registered identity records
pub struct IdentityRegistry<R: UserRepository> {
    repo: Arc<R>,
    // Serializes the check-then-insert sequence so two concurrent creations
    // with the same username cannot both pass the uniqueness check.
    create_lock: Mutex<()>,
}

impl<R: UserRepository> IdentityRegistry<R> {
    /// Create a new registry over a repository
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            create_lock: Mutex::new(()),
        }
    }

    /// Register a new user
    ///
    /// Check order is an observable contract: input validation first, then
    /// username uniqueness, then email uniqueness. The first failing check
    /// wins and short-circuits; the email check never runs when the
    /// username check already failed.
    pub async fn create(&self, candidate: NewUser) -> Result<User, IdentityError> {
        let candidate = validate(candidate)?;

        let _guard = self.create_lock.lock().await;

        if self.repo.count_by_username(&candidate.username).await? > 0 {
            return Err(IdentityError::DuplicateUsername);
        }
        if self.repo.count_by_email(&candidate.email).await? > 0 {
            return Err(IdentityError::DuplicateEmail);
        }

        match self.repo.insert(&candidate).await {
            Ok(user) => Ok(user),
            // The unique indexes can still fire if storage is shared with
            // another writer; keep the duplicate-specific error shape.
            Err(DbError::Constraint(msg)) if msg.contains("username") => {
                Err(IdentityError::DuplicateUsername)
            }
            Err(DbError::Constraint(msg)) if msg.contains("email") => {
                Err(IdentityError::DuplicateEmail)
            }
            Err(e) => Err(IdentityError::Storage(e)),
        }
    }

    /// All registered users in creation order
    pub async fn list_all(&self) -> Result<Vec<User>, IdentityError> {
        Ok(self.repo.list_all().await?)
    }

    /// Look up a user by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, IdentityError> {
        Ok(self.repo.find_by_id(id).await?)
    }

    /// Look up a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        Ok(self.repo.find_by_username(username).await?)
    }

    /// Produce a throwaway preview identity
    ///
    /// The id is random, not persisted and not checked for uniqueness; this
    /// record is distinct from registered users.
    pub fn generate_ephemeral(&self) -> User {
        let id = rand::thread_rng().gen_range(EPHEMERAL_ID_RANGE);
        User::new(id, "random_user", "Random User", "random@example.com")
    }

    /// Whether the storage backend is reachable
    ///
    /// A failing probe is recovered locally and reported as `false`, never
    /// propagated as a fault.
    pub async fn storage_connected(&self) -> bool {
        self.repo.ping().await.is_ok()
    }
}

fn validate(candidate: NewUser) -> Result<NewUser, IdentityError> {
    let username = candidate.username.trim().to_string();
    let name = candidate.name.trim().to_string();
    let email = candidate.email.trim().to_string();

    if username.is_empty() {
        return Err(IdentityError::InvalidInput("username must not be empty".to_string()));
    }
    if name.is_empty() {
        return Err(IdentityError::InvalidInput("name must not be empty".to_string()));
    }
    if email.is_empty() {
        return Err(IdentityError::InvalidInput("email must not be empty".to_string()));
    }
    if !looks_like_email(&email) {
        return Err(IdentityError::InvalidInput(
            "email must be of the form local@domain".to_string(),
        ));
    }

    Ok(NewUser {
        username,
        name,
        email,
    })
}

/// Structural email check: non-empty local and domain around a single '@'
fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !s.contains(char::is_whitespace)
        }
        None => false,
    }
}
