//! Fixed credential store for HTTP Basic verification
//!
//! The store holds the principals configured at startup. Secrets are hashed
//! with Argon2id before the store is built; verification goes through the
//! hash so the comparison never early-exits on a prefix mismatch.

use std::collections::HashMap;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::config::PrincipalConfig;
use crate::models::Principal;

/// Hash a secret using Argon2id
///
/// Returns the hash in PHC string format with a random salt.
pub fn hash_secret(secret: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashFailed(e.to_string()))
}

/// Verify a secret against a stored Argon2id hash
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Error type for secret hashing operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// Hashing failed
    #[error("Hash failed: {0}")]
    HashFailed(String),
}

/// The set of principals allowed to authenticate
///
/// Immutable after construction and safely shared across requests.
pub struct CredentialStore {
    principals: HashMap<String, Principal>,
    // Burned on unknown-name lookups so response timing does not reveal
    // whether a name exists.
    decoy_hash: String,
}

impl CredentialStore {
    /// Build the store from configured principals, hashing each secret
    pub fn from_config(configs: &[PrincipalConfig]) -> Result<Self, HashError> {
        let mut principals = HashMap::with_capacity(configs.len());
        for cfg in configs {
            let hash = hash_secret(&cfg.password)?;
            let principal = Principal::new(&cfg.name, hash).with_roles(cfg.roles.clone());
            principals.insert(cfg.name.clone(), principal);
        }

        let decoy_hash = hash_secret("decoy")?;

        Ok(Self {
            principals,
            decoy_hash,
        })
    }

    /// Verify a presented secret for a named principal
    ///
    /// Unknown name and wrong secret are indistinguishable: both return
    /// `false`, and the unknown-name path still performs a full hash
    /// verification against a decoy hash.
    pub fn verify(&self, name: &str, presented_secret: &str) -> bool {
        match self.principals.get(name) {
            Some(principal) => verify_secret(presented_secret, &principal.secret_hash),
            None => {
                let _ = verify_secret(presented_secret, &self.decoy_hash);
                false
            }
        }
    }

    /// Resolve a principal by name (case-sensitive)
    pub fn lookup(&self, name: &str) -> Option<&Principal> {
        self.principals.get(name)
    }

    /// Number of configured principals
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// True when no principals are configured
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}
