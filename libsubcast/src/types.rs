//! Core types for Subcast

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubcastError};

/// Prefix marking a community line in an input file
pub const COMMUNITY_PREFIX: &str = "r/";

/// Base URL used to turn a permalink into a full post URL
pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

/// A named community (subreddit), stored without its `r/` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Community(String);

impl Community {
    /// Normalize a community name, stripping surrounding whitespace and the
    /// `r/` prefix when present.
    pub fn new(name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim();
        let bare = trimmed.strip_prefix(COMMUNITY_PREFIX).unwrap_or(trimmed);
        Self(bare.trim().to_string())
    }

    /// Interpret one line of an input file.
    ///
    /// Only lines beginning with `r/` count. A line holding nothing but the
    /// prefix yields `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        if !line.starts_with(COMMUNITY_PREFIX) || line.trim().is_empty() {
            return None;
        }
        let community = Self::new(line);
        (!community.0.is_empty()).then_some(community)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Community {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A post flair template offered by a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flair {
    pub flair_text: String,
    pub flair_id: String,
}

impl Flair {
    pub fn new(text: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            flair_text: text.into(),
            flair_id: id.into(),
        }
    }
}

/// Wire body of `GET /subreddit-flairs/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlairList {
    pub flairs: Vec<Flair>,
}

/// Wire body of `POST /post/{name}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub flair_id: Option<String>,
}

/// What a post carries besides its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKind {
    /// Self post with a markdown body
    Text(String),
    /// Link post
    Link(String),
}

impl PostKind {
    /// Form value of the submit `kind` field
    pub fn kind(&self) -> &'static str {
        match self {
            PostKind::Text(_) => "self",
            PostKind::Link(_) => "link",
        }
    }
}

pub const BOTH_BODY_AND_URL: &str = "Submit either a text post or a link post, not both.";
pub const NEITHER_BODY_NOR_URL: &str = "A body or URL must be provided for the post.";

impl PostRequest {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn link(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_flair(mut self, flair_id: Option<String>) -> Self {
        self.flair_id = flair_id;
        self
    }

    /// Resolve the body/url pair into exactly one [`PostKind`].
    ///
    /// Empty strings count as absent.
    pub fn kind(&self) -> Result<PostKind> {
        let body = self.body.as_deref().filter(|b| !b.is_empty());
        let url = self.url.as_deref().filter(|u| !u.is_empty());

        match (body, url) {
            (Some(_), Some(_)) => Err(SubcastError::InvalidInput(BOTH_BODY_AND_URL.to_string())),
            (Some(body), None) => Ok(PostKind::Text(body.to_string())),
            (None, Some(url)) => Ok(PostKind::Link(url.to_string())),
            (None, None) => Err(SubcastError::InvalidInput(NEITHER_BODY_NOR_URL.to_string())),
        }
    }

    /// Flair id with empty strings treated as "no flair"
    pub fn flair(&self) -> Option<&str> {
        self.flair_id.as_deref().filter(|f| !f.is_empty())
    }
}

/// A created post as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    /// Site-relative path, e.g. `/r/rust/comments/abc123/hello/`
    pub permalink: String,
}

impl Submission {
    pub fn url(&self) -> String {
        format!("{}{}", REDDIT_WEB_BASE, self.permalink)
    }
}

/// Wire body of a successful `POST /post/{name}`.
///
/// Every field is optional on the client side so a partial answer can be
/// classified as a failure instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub post_url: Option<String>,
}

impl PostResponse {
    pub fn submitted(submission: &Submission) -> Self {
        Self {
            message: Some("Post submitted successfully".to_string()),
            post_id: Some(submission.id.clone()),
            post_url: Some(submission.url()),
        }
    }
}
