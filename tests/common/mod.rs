//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use identity_gate::auth::{AccessPolicy, AuthenticationGate, CredentialStore, TokenService};
use identity_gate::config::PrincipalConfig;
use identity_gate::database::SqliteUserRepository;
use identity_gate::registry::IdentityRegistry;
use identity_gate::server::AppState;

/// Signing secret shared by all integration tests
pub const TEST_SECRET: &str = "integration-test-secret";

/// Reference principals: admin/password with ADMIN, user/password with USER
pub fn test_principals() -> Vec<PrincipalConfig> {
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

/// Create an in-memory repository for testing
pub async fn create_test_repository() -> Arc<SqliteUserRepository> {
    Arc::new(
        SqliteUserRepository::in_memory()
            .await
            .expect("Failed to create test repository"),
    )
}

/// Create a test application state backed by an in-memory database
pub async fn create_test_state() -> AppState<SqliteUserRepository> {
    create_test_state_with_ttl(3600).await
}

/// Create a test application state with a custom token TTL
pub async fn create_test_state_with_ttl(ttl_secs: u64) -> AppState<SqliteUserRepository> {
    let credentials = Arc::new(
        CredentialStore::from_config(&test_principals()).expect("Failed to build store"),
    );
    let tokens = Arc::new(TokenService::new(
        TEST_SECRET,
        ttl_secs,
        Arc::clone(&credentials),
    ));
    let policy = Arc::new(AccessPolicy::service_defaults());
    let gate = Arc::new(AuthenticationGate::new(
        Arc::clone(&credentials),
        Arc::clone(&tokens),
        policy,
    ));
    let registry = Arc::new(IdentityRegistry::new(create_test_repository().await));

    AppState {
        gate,
        credentials,
        tokens,
        registry,
    }
}

/// Run a test server in the background and return the address
///
/// The server shuts down when the returned sender is dropped or sent.
pub async fn run_test_server(
    state: AppState<SqliteUserRepository>,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let app = identity_gate::server::build_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    // Give the server a moment to start (100ms is sufficient for slow CI systems)
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (addr, shutdown_tx)
}

/// Obtain a bearer token through the login endpoint
pub async fn login(addr: std::net::SocketAddr, username: &str, password: &str) -> String {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{}/auth/login", addr))
        .json(&serde_json::json!({"username": username, "password": password}))
        .send()
        .await
        .expect("Login request failed");

    assert_eq!(response.status(), 200, "Login should succeed");

    let body: serde_json::Value = response.json().await.expect("Invalid login response");
    body["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string()
}
