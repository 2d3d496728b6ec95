//! Configuration management for identity-gate
//!
//! This module handles loading, parsing, and validating application
//! configuration from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthSettings,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // Expand environment variables before parsing
        let expanded = expand_env_vars(yaml);
        let config: Config =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables with prefix IDENTITY_GATE_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("IDENTITY_GATE_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("IDENTITY_GATE_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }

        if let Ok(path) = std::env::var("IDENTITY_GATE_DATABASE_PATH") {
            config.database.path = path;
        }

        if let Ok(secret) = std::env::var("IDENTITY_GATE_TOKEN_SECRET") {
            config.auth.token_secret = secret;
        }
        if let Ok(ttl) = std::env::var("IDENTITY_GATE_TOKEN_TTL_SECS") {
            config.auth.token_ttl_secs = ttl
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid token TTL".to_string()))?;
        }

        if let Ok(level) = std::env::var("IDENTITY_GATE_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.token_secret.is_empty() {
            return Err(ConfigError::Invalid("token secret is empty".to_string()));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("token TTL must be positive".to_string()));
        }
        if self.auth.principals.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one principal must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    /// Process-wide signing secret for bearer tokens
    #[serde(default = "default_token_secret")]
    pub token_secret: String,

    /// Token time-to-live in seconds
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,

    /// Configured principals
    #[serde(default = "default_principals")]
    pub principals: Vec<PrincipalConfig>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_secs: default_token_ttl(),
            principals: default_principals(),
        }
    }
}

fn default_token_secret() -> String {
    // Development default; override via IDENTITY_GATE_TOKEN_SECRET in production
    "identity-gate-dev-secret".to_string()
}

fn default_token_ttl() -> u64 {
    28800 // 8 hours
}

fn default_principals() -> Vec<PrincipalConfig> {
    vec![
        PrincipalConfig {
            name: "admin".to_string(),
            password: "password".to_string(),
            roles: vec!["ADMIN".to_string()],
        },
        PrincipalConfig {
            name: "user".to_string(),
            password: "password".to_string(),
            roles: vec!["USER".to_string()],
        },
    ]
}

/// A single configured principal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrincipalConfig {
    /// Principal name (case-sensitive)
    pub name: String,

    /// Plaintext secret, hashed at startup before the store is built
    pub password: String,

    /// Roles granted to this principal
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "/data/db/identity-gate.db".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
