//! Bearer token authentication for the protected routes

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Authentication middleware
///
/// Expects `Authorization: Bearer <token>` matching the configured token.
/// Returns 401 otherwise; the handler is never reached.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?;

    let presented = header_value
        .to_str()
        .ok()
        .and_then(bearer_credentials)
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.bearer_token.verify(presented) {
        warn!("Rejected request to {} with an invalid token", request.uri().path());
        return Err(AuthError::InvalidCredentials);
    }

    Ok(next.run(request).await)
}

/// Credentials part of a `Bearer` authorization value
///
/// The scheme is matched case-insensitively. Empty credentials count as absent.
fn bearer_credentials(value: &str) -> Option<&str> {
    let (scheme, credentials) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let credentials = credentials.trim();
    (!credentials.is_empty()).then_some(credentials)
}

/// Authentication error types for HTTP responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let detail = match self {
            AuthError::MissingCredentials => "Credentials are missing",
            AuthError::InvalidCredentials => "Invalid token credentials",
        };

        let mut response = (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_credentials() {
        assert_eq!(bearer_credentials("Bearer abc"), Some("abc"));
        assert_eq!(bearer_credentials("bearer abc"), Some("abc"));
        assert_eq!(bearer_credentials("Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_credentials("Basic abc"), None);
        assert_eq!(bearer_credentials("Bearer"), None);
        assert_eq!(bearer_credentials("Bearer "), None);
        assert_eq!(bearer_credentials("abc"), None);
    }

    #[test]
    fn test_auth_error_carries_challenge() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
