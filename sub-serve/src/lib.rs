//! sub-serve library - HTTP front end for a Reddit session
//!
//! Exposes flair lookup and post submission behind a static bearer token.
//! `GET /` is the only public route.

use std::any::Any;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use libsubcast::platforms::Platform;
use libsubcast::BearerToken;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The one platform session, shared by every request
    pub platform: Arc<dyn Platform>,
    /// Token every protected route expects
    pub bearer_token: Arc<BearerToken>,
}

impl AppState {
    pub fn new(platform: Arc<dyn Platform>, bearer_token: BearerToken) -> Self {
        Self {
            platform,
            bearer_token: Arc::new(bearer_token),
        }
    }
}

/// Build application router
///
/// Protected routes sit behind [`api::auth_middleware`]. Handler panics are
/// turned into a 500 with an `{"error": ...}` body.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/secure-ping", get(api::secure_ping))
        .route("/subreddit-flairs/:name", get(api::get_subreddit_flairs))
        .route("/post/:name", post(api::post_to_subreddit))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    tracing::error!("Request handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
