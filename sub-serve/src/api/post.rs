//! Post submission endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use libsubcast::platforms::NewPost;
use libsubcast::{Community, PostRequest, PostResponse, SubcastError};
use tracing::{error, info};

use super::ApiError;
use crate::AppState;

/// POST /post/:name
///
/// Validates the request before anything reaches the platform: exactly one
/// of `body` and `url` must be present.
pub async fn post_to_subreddit(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let community = Community::new(&name);

    let post = NewPost::from_request(&request).map_err(|e| match e {
        SubcastError::InvalidInput(message) => ApiError::BadRequest(message),
        other => ApiError::BadRequest(other.to_string()),
    })?;

    match state.platform.submit(&community, &post).await {
        Ok(submission) => {
            info!("Posted to r/{}: {}", community, submission.url());
            Ok(Json(PostResponse::submitted(&submission)))
        }
        Err(e) => {
            error!("Posting to r/{} failed: {}", community, e);
            Err(ApiError::BadRequest(format!(
                "Error posting to subreddit: {}",
                e
            )))
        }
    }
}
