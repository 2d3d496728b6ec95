//! Domain models for identity-gate
//!
//! This module contains the core domain models used throughout the application.

pub mod principal;
pub mod user;

// Re-export commonly used types
pub use principal::{AccessDecision, DenyReason, Principal};
pub use user::{LoginRequest, LoginResponse, NewUser, User};
