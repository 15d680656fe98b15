//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate
//! authentication failures, per-community flairs and per-community posting
//! failures. It's designed for use in integration tests (the HTTP service's
//! route tests in particular) without real credentials or network access.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::{NewPost, Platform};
use crate::types::{Community, Flair, Submission};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name
    pub name: String,

    /// Whether authentication should succeed
    pub auth_succeeds: bool,

    /// Flairs returned per community; communities not listed have none
    pub flairs: HashMap<String, Vec<Flair>>,

    /// Communities whose flair lookup fails
    pub failing_flair_lookups: HashSet<String>,

    /// Communities whose submissions fail
    pub failing_submissions: HashSet<String>,

    /// Error returned for failing operations
    pub error: Option<PlatformError>,

    /// Number of times authenticate has been called
    pub auth_call_count: Arc<Mutex<usize>>,

    /// Every submission attempted, successful or not
    pub submitted: Arc<Mutex<Vec<(Community, NewPost)>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_succeeds: true,
            flairs: HashMap::new(),
            failing_flair_lookups: HashSet::new(),
            failing_submissions: HashSet::new(),
            error: None,
            auth_call_count: Arc::new(Mutex::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds and offers no flairs
    pub fn success() -> Self {
        Self::new(MockConfig::default())
    }

    /// Create a mock platform whose credentials are rejected
    pub fn auth_failure() -> Self {
        Self::new(MockConfig {
            auth_succeeds: false,
            ..Default::default()
        })
    }

    /// Offer `flairs` in `community`
    pub fn with_flairs(mut self, community: &str, flairs: Vec<Flair>) -> Self {
        self.config.flairs.insert(community.to_string(), flairs);
        self
    }

    /// Make flair lookups for `community` fail
    pub fn failing_flairs(mut self, community: &str) -> Self {
        self.config.failing_flair_lookups.insert(community.to_string());
        self
    }

    /// Make submissions to `community` fail with `error`
    pub fn failing_submit(mut self, community: &str, error: PlatformError) -> Self {
        self.config.failing_submissions.insert(community.to_string());
        self.config.error = Some(error);
        self
    }

    /// Get the number of times authenticate was called
    pub fn auth_call_count(&self) -> usize {
        *self.config.auth_call_count.lock().unwrap()
    }

    /// Get every submission attempted so far
    pub fn submitted(&self) -> Vec<(Community, NewPost)> {
        self.config.submitted.lock().unwrap().clone()
    }

    /// Shared handle on the submission log, usable after the platform has
    /// been moved behind an `Arc<dyn Platform>`
    pub fn submitted_handle(&self) -> Arc<Mutex<Vec<(Community, NewPost)>>> {
        Arc::clone(&self.config.submitted)
    }

    fn failure(&self, fallback: &str) -> PlatformError {
        self.config
            .error
            .clone()
            .unwrap_or_else(|| PlatformError::Posting(fallback.to_string()))
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn authenticate(&self) -> Result<()> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        if self.config.auth_succeeds {
            Ok(())
        } else {
            Err(PlatformError::Authentication("Mock authentication failed".to_string()).into())
        }
    }

    async fn list_flairs(&self, community: &Community) -> Result<Vec<Flair>> {
        self.authenticate().await?;

        if self.config.failing_flair_lookups.contains(community.as_str()) {
            return Err(PlatformError::NotFound(format!("r/{} not found", community)).into());
        }

        Ok(self
            .config
            .flairs
            .get(community.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn submit(&self, community: &Community, post: &NewPost) -> Result<Submission> {
        self.authenticate().await?;

        self.config
            .submitted
            .lock()
            .unwrap()
            .push((community.clone(), post.clone()));

        if self.config.failing_submissions.contains(community.as_str()) {
            return Err(self.failure("Mock posting failed").into());
        }

        let id = uuid::Uuid::new_v4().simple().to_string()[..7].to_string();
        Ok(Submission {
            permalink: format!("/r/{}/comments/{}/mock/", community, id),
            id,
        })
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PostKind;

    fn text_post() -> NewPost {
        NewPost {
            title: "Title".to_string(),
            kind: PostKind::Text("Body".to_string()),
            flair_id: None,
        }
    }

    #[tokio::test]
    async fn test_mock_success() {
        let platform = MockPlatform::success();

        assert_eq!(platform.name(), "mock");
        platform.authenticate().await.unwrap();
        assert_eq!(platform.auth_call_count(), 1);

        let community = Community::new("rust");
        let submission = platform.submit(&community, &text_post()).await.unwrap();
        assert!(submission.permalink.starts_with("/r/rust/comments/"));
        assert_eq!(submission.id.len(), 7);

        let submitted = platform.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, community);
    }

    #[tokio::test]
    async fn test_mock_auth_failure() {
        let platform = MockPlatform::auth_failure();

        let result = platform.list_flairs(&Community::new("rust")).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Mock authentication failed"));
        assert!(platform.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_mock_flairs() {
        let platform = MockPlatform::success()
            .with_flairs("rust", vec![Flair::new("Discussion", "f1")])
            .failing_flairs("gone");

        let flairs = platform.list_flairs(&Community::new("rust")).await.unwrap();
        assert_eq!(flairs, vec![Flair::new("Discussion", "f1")]);

        let none = platform.list_flairs(&Community::new("python")).await.unwrap();
        assert!(none.is_empty());

        assert!(platform.list_flairs(&Community::new("gone")).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_failing_submit_is_recorded() {
        let platform = MockPlatform::success()
            .failing_submit("locked", PlatformError::Validation("Community is locked".to_string()));

        let err = platform
            .submit(&Community::new("locked"), &text_post())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Community is locked"));
        assert_eq!(platform.submitted().len(), 1);
    }
}
