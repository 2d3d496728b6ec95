//! HTTP router for identity-gate
//!
//! This module defines the axum router that handles all HTTP requests.
//! It provides routes for:
//! - Health checks
//! - Token login
//! - User registration and lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AuthenticationGate, CredentialStore, TokenService};
use crate::database::UserRepository;
use crate::error::IdentityError;
use crate::models::{LoginRequest, LoginResponse, NewUser};
use crate::registry::IdentityRegistry;

use super::middleware::auth_middleware;

/// Shared application state
pub struct AppState<R: UserRepository> {
    /// Per-request authentication gate
    pub gate: Arc<AuthenticationGate>,

    /// Fixed credential store
    pub credentials: Arc<CredentialStore>,

    /// Token issuer and verifier
    pub tokens: Arc<TokenService>,

    /// User registry
    pub registry: Arc<IdentityRegistry<R>>,
}

impl<R: UserRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            gate: Arc::clone(&self.gate),
            credentials: Arc::clone(&self.credentials),
            tokens: Arc::clone(&self.tokens),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
}

/// User registration request body
///
/// Fields are optional so the handler can report missing fields with a 400
/// instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Build the main application router
///
/// The authentication middleware wraps every route; public access is decided
/// by the gate's access policy, not by route placement.
pub fn build_router<R: UserRepository + 'static>(state: AppState<R>) -> Router {
    let gate = Arc::clone(&state.gate);

    Router::new()
        .route("/health", get(health_handler::<R>))
        .route("/auth/login", post(login_handler::<R>))
        .route("/user", get(random_user_handler::<R>))
        .route("/user", post(create_user_handler::<R>))
        .route("/user/all", get(list_users_handler::<R>))
        .route("/user/:id", get(get_user_handler::<R>))
        .layer(middleware::from_fn_with_state(gate, auth_middleware))
        .with_state(state)
}

/// Domain error response
///
/// Carries a machine-readable code alongside a human-readable message.
struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_input",
            message: message.into(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        let status = match &e {
            IdentityError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            IdentityError::DuplicateUsername | IdentityError::DuplicateEmail => {
                StatusCode::CONFLICT
            }
            IdentityError::NotFound => StatusCode::NOT_FOUND,
            IdentityError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage faults are logged server-side and reported generically
        let message = match &e {
            IdentityError::Storage(inner) => {
                tracing::error!(error = %inner, "Storage operation failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        Self {
            status,
            code: e.code(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Health check endpoint handler
///
/// Reports degraded (still 200) when the storage probe fails; liveness and
/// storage reachability are separate signals.
async fn health_handler<R: UserRepository>(State(state): State<AppState<R>>) -> impl IntoResponse {
    let database = state.registry.storage_connected().await;
    let status = if database { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}

/// Login endpoint handler
///
/// Verifies fixed credentials and returns a signed bearer token. Failures
/// use the same response as the authentication middleware so the login
/// endpoint leaks nothing the rest of the service does not.
async fn login_handler<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(ApiError::bad_request("Username and password are required"));
    };

    if !state.credentials.verify(&username, &password) {
        return Err(ApiError {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_credentials",
            message: "Invalid credentials".to_string(),
        });
    }

    // verify() only succeeds for stored principals, so the lookup holds
    let principal = state
        .credentials
        .lookup(&username)
        .ok_or_else(|| ApiError {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_credentials",
            message: "Invalid credentials".to_string(),
        })?;

    let token = state.tokens.issue(principal).map_err(|e| {
        tracing::error!(error = %e, "Token issuance failed");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "token_error",
            message: "Internal server error".to_string(),
        }
    })?;

    tracing::info!(username = %username, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        username: principal.name.clone(),
    }))
}

/// Random user preview handler
///
/// Returns a throwaway identity; nothing is persisted.
async fn random_user_handler<R: UserRepository>(
    State(state): State<AppState<R>>,
) -> impl IntoResponse {
    Json(state.registry.generate_ephemeral())
}

/// User registration handler
async fn create_user_handler<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let (Some(username), Some(name), Some(email)) = (body.username, body.name, body.email) else {
        return Err(ApiError::bad_request(
            "username, name and email are required",
        ));
    };

    let user = state
        .registry
        .create(NewUser { username, name, email })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Json(user).into_response())
}

/// List all users handler
async fn list_users_handler<R: UserRepository>(
    State(state): State<AppState<R>>,
) -> Result<Response, ApiError> {
    let users = state.registry.list_all().await?;
    Ok(Json(users).into_response())
}

/// Single user lookup handler
async fn get_user_handler<R: UserRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match state.registry.find_by_id(id).await? {
        Some(user) => Ok(Json(user).into_response()),
        None => Err(ApiError::from(IdentityError::NotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessPolicy;
    use crate::config::PrincipalConfig;
    use crate::database::MockUserRepository;
    use crate::models::User;

    fn test_state(mock: MockUserRepository) -> AppState<MockUserRepository> {
        let configs = vec![PrincipalConfig {
            name: "admin".to_string(),
            password: "password".to_string(),
            roles: vec!["ADMIN".to_string()],
        }];
        let credentials = Arc::new(CredentialStore::from_config(&configs).unwrap());
        let tokens = Arc::new(TokenService::new(
            "router-test-secret",
            3600,
            Arc::clone(&credentials),
        ));
        let policy = Arc::new(AccessPolicy::service_defaults());
        let gate = Arc::new(AuthenticationGate::new(
            Arc::clone(&credentials),
            Arc::clone(&tokens),
            policy,
        ));
        let registry = Arc::new(IdentityRegistry::new(Arc::new(mock)));

        AppState {
            gate,
            credentials,
            tokens,
            registry,
        }
    }

    async fn serve(state: AppState<MockUserRepository>) -> std::net::SocketAddr {
        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        addr
    }

    // Test 1: health reports version and storage state without credentials
    #[tokio::test]
    async fn test_health_handler() {
        let mut mock = MockUserRepository::new();
        mock.expect_ping().returning(|| Ok(()));

        let addr = serve(test_state(mock)).await;
        let response = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: HealthResponse = response.json().await.unwrap();
        assert_eq!(body.status, "healthy");
        assert!(body.database);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    // Test 2: login returns a token the gate accepts
    #[tokio::test]
    async fn test_login_round_trip() {
        let mock = MockUserRepository::new();
        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/auth/login", addr))
            .json(&serde_json::json!({"username": "admin", "password": "password"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: LoginResponse = response.json().await.unwrap();
        assert_eq!(body.username, "admin");
        assert!(!body.token.is_empty());
    }

    // Test 3: login with bad credentials is 401
    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let mock = MockUserRepository::new();
        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/auth/login", addr))
            .json(&serde_json::json!({"username": "admin", "password": "wrong"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 401);
    }

    // Test 4: login with missing fields is 400, not a deserialization error
    #[tokio::test]
    async fn test_login_missing_fields() {
        let mock = MockUserRepository::new();
        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/auth/login", addr))
            .json(&serde_json::json!({"username": "admin"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "invalid_input");
    }

    // Test 5: registration requires credentials and returns the new record
    #[tokio::test]
    async fn test_create_user() {
        let mut mock = MockUserRepository::new();
        mock.expect_count_by_username().returning(|_| Ok(0));
        mock.expect_count_by_email().returning(|_| Ok(0));
        mock.expect_insert()
            .returning(|c| Ok(User::new(1, &c.username, &c.name, &c.email)));

        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();
        let payload =
            serde_json::json!({"username": "john_doe", "name": "John Doe", "email": "john@example.com"});

        // Without credentials the middleware rejects the request
        let response = client
            .post(format!("http://{}/user", addr))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);

        let response = client
            .post(format!("http://{}/user", addr))
            .basic_auth("admin", Some("password"))
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: User = response.json().await.unwrap();
        assert_eq!(body.id, 1);
        assert_eq!(body.username, "john_doe");
    }

    // Test 6: duplicate registration is 409 with a duplicate code
    #[tokio::test]
    async fn test_create_user_duplicate() {
        let mut mock = MockUserRepository::new();
        mock.expect_count_by_username().returning(|_| Ok(1));

        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/user", addr))
            .basic_auth("admin", Some("password"))
            .json(&serde_json::json!({"username": "john_doe", "name": "John Doe", "email": "john@example.com"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 409);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "duplicate_username");
    }

    // Test 7: random user preview is public and not persisted
    #[tokio::test]
    async fn test_random_user_public() {
        let mut mock = MockUserRepository::new();
        mock.expect_insert().times(0);

        let addr = serve(test_state(mock)).await;
        let response = reqwest::get(format!("http://{}/user", addr)).await.unwrap();

        assert_eq!(response.status(), 200);
        let body: User = response.json().await.unwrap();
        assert_eq!(body.username, "random_user");
        assert!(body.id >= 1 && body.id < 1_000_000);
    }

    // Test 8: listing users requires credentials
    #[tokio::test]
    async fn test_list_users() {
        let mut mock = MockUserRepository::new();
        mock.expect_list_all().returning(|| {
            Ok(vec![
                User::new(1, "a", "A", "a@example.com"),
                User::new(2, "b", "B", "b@example.com"),
            ])
        });

        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/user/all", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);

        let response = client
            .get(format!("http://{}/user/all", addr))
            .basic_auth("admin", Some("password"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: Vec<User> = response.json().await.unwrap();
        assert_eq!(body.len(), 2);
    }

    // Test 9: lookup by id returns 404 with a code when missing
    #[tokio::test]
    async fn test_get_user_by_id() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(User::new(1, "a", "A", "a@example.com"))));
        mock.expect_find_by_id()
            .withf(|id| *id == 42)
            .returning(|_| Ok(None));

        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/user/1", addr))
            .basic_auth("admin", Some("password"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = client
            .get(format!("http://{}/user/42", addr))
            .basic_auth("admin", Some("password"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["code"], "not_found");
    }

    // Test 10: storage failures surface as generic 500s
    #[tokio::test]
    async fn test_storage_failure_is_generic_500() {
        let mut mock = MockUserRepository::new();
        mock.expect_list_all()
            .returning(|| Err(crate::error::DbError::NotFound));

        let addr = serve(test_state(mock)).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/user/all", addr))
            .basic_auth("admin", Some("password"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], "storage_error");
    }
}
