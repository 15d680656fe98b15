//! Subcast - post once to many Reddit communities
//!
//! This library holds the pieces shared by the `sub-serve` HTTP service and
//! the `sub-batch` orchestrator: the platform session, the service client,
//! batch orchestration, configuration and logging.

pub mod api_client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod platforms;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use api_client::{ApiClient, PosterApi};
pub use config::Config;
pub use credentials::{BearerToken, RedditCredentials};
pub use error::{ClientError, ConfigError, PlatformError, Result, SubcastError};
pub use types::{Community, Flair, PostKind, PostRequest, PostResponse, Submission};
