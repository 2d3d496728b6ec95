//! identity-gate - An authenticated user registration and lookup service
//!
//! This crate provides a small HTTP service that manages user records behind
//! two authentication schemes: HTTP Basic against a fixed credential store,
//! and bearer tokens issued by a login endpoint.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod registry;
pub mod server;
