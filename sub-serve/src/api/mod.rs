//! HTTP API handlers for sub-serve

pub mod auth;
pub mod error;
pub mod flairs;
pub mod health;
pub mod post;

pub use auth::auth_middleware;
pub use error::ApiError;
pub use flairs::get_subreddit_flairs;
pub use health::{health_routes, secure_ping};
pub use post::post_to_subreddit;
