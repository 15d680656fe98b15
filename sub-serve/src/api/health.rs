//! Liveness endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Response for `GET /`
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub status_code: u16,
}

/// Response for `GET /secure-ping`
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub status_code: u16,
}

/// GET /
///
/// Does NOT require authentication.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Reddit API Poster is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        status_code: 200,
    })
}

/// GET /secure-ping
///
/// Reaching the handler at all means the token was accepted.
pub async fn secure_ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "You Are Secure!".to_string(),
        status_code: 200,
    })
}

/// Build the public routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}
