//! Platform abstraction and implementations
//!
//! A [`Platform`] is the one long-lived session to the remote site. The HTTP
//! service owns it behind an `Arc` and hands it to every request handler.
//!
//! # Examples
//!
//! ```no_run
//! use libsubcast::platforms::{NewPost, Platform, reddit::RedditClient};
//! use libsubcast::{Community, Config, PostRequest};
//!
//! # async fn example() -> libsubcast::Result<()> {
//! let config = Config::from_env()?;
//! let reddit = RedditClient::new(config.reddit)?;
//!
//! let community = Community::new("r/test");
//! for flair in reddit.list_flairs(&community).await? {
//!     println!("{} ({})", flair.flair_text, flair.flair_id);
//! }
//!
//! let post = NewPost::from_request(&PostRequest::text("Hello", "First post"))?;
//! let submission = reddit.submit(&community, &post).await?;
//! println!("Posted: {}", submission.url());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Community, Flair, PostKind, PostRequest, Submission};

pub mod mock;
pub mod reddit;

/// A validated post, ready to hand to a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub kind: PostKind,
    pub flair_id: Option<String>,
}

impl NewPost {
    /// Validate a wire request.
    ///
    /// Fails with `InvalidInput` when the title is blank or when the request
    /// does not carry exactly one of body and url.
    pub fn from_request(request: &PostRequest) -> Result<Self> {
        let kind = request.kind()?;
        if request.title.trim().is_empty() {
            return Err(crate::SubcastError::InvalidInput(
                "A title must be provided for the post.".to_string(),
            ));
        }

        Ok(Self {
            title: request.title.clone(),
            kind,
            flair_id: request.flair().map(str::to_string),
        })
    }
}

/// Session with a remote community platform
///
/// Implementations keep whatever authentication state they need internally,
/// so every method takes `&self` and a single instance can serve concurrent
/// requests.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Obtain or refresh credentials with the platform
    ///
    /// The other methods call this lazily; calling it up front only surfaces
    /// credential problems earlier.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when the platform rejects the
    /// credentials, `PlatformError::Network` when it cannot be reached.
    async fn authenticate(&self) -> Result<()>;

    /// List the post flair templates of a community
    ///
    /// An empty list means the community offers no flairs.
    async fn list_flairs(&self, community: &Community) -> Result<Vec<Flair>>;

    /// Submit a post to a community
    ///
    /// Returns the created post's id and permalink.
    async fn submit(&self, community: &Community, post: &NewPost) -> Result<Submission>;

    /// Lowercase identifier for the platform (e.g. "reddit")
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_post_from_text_request() {
        let request = PostRequest::text("Title", "Body").with_flair(Some("f1".to_string()));
        let post = NewPost::from_request(&request).unwrap();
        assert_eq!(post.title, "Title");
        assert_eq!(post.kind, PostKind::Text("Body".to_string()));
        assert_eq!(post.flair_id.as_deref(), Some("f1"));
    }

    #[test]
    fn test_new_post_rejects_blank_title() {
        let request = PostRequest::link("   ", "https://example.com");
        let err = NewPost::from_request(&request).unwrap_err();
        assert!(err.to_string().contains("title"));
        assert_eq!(err.exit_code(), 3);
    }
}
