//! Authentication system for identity-gate
//!
//! This module provides authentication and authorization functionality:
//! - Fixed credential store for HTTP Basic verification
//! - Bearer token issuance and verification
//! - Static access policy (public vs protected routes)
//! - The per-request authentication gate

pub mod credentials;
pub mod gate;
pub mod policy;
pub mod token;

pub use credentials::{hash_secret, verify_secret, CredentialStore, HashError};
pub use gate::{AuthenticationGate, CredentialAttempt};
pub use policy::{Access, AccessPolicy};
pub use token::TokenService;
