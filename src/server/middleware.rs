//! HTTP middleware for identity-gate
//!
//! This module provides middleware layers for:
//! - Authentication (basic credentials and bearer tokens)
//! - Request/response logging

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthenticationGate;
use crate::models::{AccessDecision, DenyReason, Principal};

/// Authenticated principal extension for requests
///
/// Present on a request only when it carried verified credentials; anonymous
/// requests on public routes pass through without it.
#[derive(Clone, Debug)]
pub struct AuthenticatedPrincipal(pub Principal);

/// Authentication middleware function
///
/// This middleware:
/// 1. Extracts the Authorization header
/// 2. Asks the authentication gate for an allow/deny decision
/// 3. Adds the authenticated principal to the request extensions on allow
///
/// Every deny maps to 401 so a caller cannot distinguish a wrong password
/// from an unknown username or a stale token by status code.
pub async fn auth_middleware(
    State(gate): State<Arc<AuthenticationGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, DenyResponse> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let decision = gate.authorize(
        request.method(),
        request.uri().path(),
        auth_header.as_deref(),
    );

    match decision {
        AccessDecision::Allow(Some(principal)) => {
            request
                .extensions_mut()
                .insert(AuthenticatedPrincipal(principal));
            Ok(next.run(request).await)
        }
        AccessDecision::Allow(None) => Ok(next.run(request).await),
        AccessDecision::Deny(reason) => Err(DenyResponse::from_reason(reason)),
    }
}

/// Authentication error response
///
/// Always 401; the message varies by reason but never names an account.
pub struct DenyResponse {
    status: StatusCode,
    message: String,
}

impl DenyResponse {
    fn from_reason(reason: DenyReason) -> Self {
        let message = match reason {
            DenyReason::InvalidCredentials => "Invalid credentials",
            DenyReason::InvalidToken => "Invalid token",
            DenyReason::NoCredentials => "Missing authorization header",
            DenyReason::UnsupportedScheme => "Unsupported authentication scheme",
        };
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for DenyResponse {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message
        });
        (self.status, axum::Json(body)).into_response()
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}
