//! Flair lookup endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use libsubcast::types::FlairList;
use libsubcast::Community;
use tracing::{error, info};

use super::ApiError;
use crate::AppState;

/// GET /subreddit-flairs/:name
///
/// Lists the community's post flairs. A leading `r/` in the name is ignored.
pub async fn get_subreddit_flairs(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FlairList>, ApiError> {
    let community = Community::new(&name);

    match state.platform.list_flairs(&community).await {
        Ok(flairs) => {
            info!("Listed {} flairs for r/{}", flairs.len(), community);
            Ok(Json(FlairList { flairs }))
        }
        Err(e) => {
            error!("Flair lookup for r/{} failed: {}", community, e);
            Err(ApiError::BadRequest(format!(
                "Error getting subreddit flairs: {}",
                e
            )))
        }
    }
}
