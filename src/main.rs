//! identity-gate - An authenticated user registration and lookup service
//!
//! This is the main entry point for the identity-gate application.

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::info;

use identity_gate::auth::{AccessPolicy, AuthenticationGate, CredentialStore, TokenService};
use identity_gate::config::Config;
use identity_gate::database::SqliteUserRepository;
use identity_gate::registry::IdentityRegistry;
use identity_gate::server::{AppState, Server};

/// identity-gate - An authenticated user registration and lookup service
#[derive(Parser, Debug)]
#[command(name = "identity-gate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "IDENTITY_GATE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let config = load_config(&args)?;

    // Initialize tracing/logging
    init_tracing(&config.logging.level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting identity-gate"
    );

    // Initialize database
    let repository = SqliteUserRepository::new(&config.database.path).await?;
    let repository = Arc::new(repository);
    info!(path = %config.database.path, "Database initialized");

    // Build the authentication components; principal secrets are hashed here
    // and plaintext is not retained
    let credentials = Arc::new(CredentialStore::from_config(&config.auth.principals)?);
    let tokens = Arc::new(TokenService::new(
        &config.auth.token_secret,
        config.auth.token_ttl_secs,
        Arc::clone(&credentials),
    ));
    let policy = Arc::new(AccessPolicy::service_defaults());
    let gate = Arc::new(AuthenticationGate::new(
        Arc::clone(&credentials),
        Arc::clone(&tokens),
        Arc::clone(&policy),
    ));
    info!(
        principals = config.auth.principals.len(),
        token_ttl_secs = config.auth.token_ttl_secs,
        "Authentication gate initialized"
    );

    let registry = Arc::new(IdentityRegistry::new(repository));

    // Create application state
    let state = AppState {
        gate,
        credentials,
        tokens,
        registry,
    };

    // Create and start the HTTP server
    let server = Server::new(config.server.clone(), state);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Starting HTTP server"
    );

    server.run(shutdown_signal()).await?;

    info!("identity-gate shutdown complete");
    Ok(())
}

/// Load configuration from file or environment
fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => {
            // Use eprintln! since tracing is not yet initialized
            eprintln!("Loading configuration from file: {}", path);
            Config::from_file(path).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
        None => {
            eprintln!("Loading configuration from environment variables");
            Config::from_env().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
        }
    }
}

/// Initialize the tracing subscriber
///
/// RUST_LOG takes precedence over the configured level.
fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("identity_gate={level},tower_http=info")));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Create a future that resolves when a shutdown signal is received
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
