//! Reddit platform implementation
//!
//! Talks to Reddit's OAuth API with the "script" application flow: the
//! account's username and password are exchanged for a bearer token, which
//! is cached until shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{redirect, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::RedditConfig;
use crate::credentials::RedditCredentials;
use crate::error::{ConfigError, PlatformError, Result};
use crate::platforms::{NewPost, Platform};
use crate::types::{Community, Flair, PostKind, Submission, REDDIT_WEB_BASE};

/// Tokens are refreshed this long before the server-side expiry
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Used when the token response omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlairTemplate {
    id: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    json: SubmitBody,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    data: Option<SubmitData>,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Map a non-success HTTP status to a `PlatformError`
fn map_status(status: StatusCode, context: &str, body: &str) -> PlatformError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{} ({})", status, body.trim())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlatformError::Authentication(format!(
            "Reddit refused {}: {}",
            context, detail
        )),
        StatusCode::NOT_FOUND => {
            PlatformError::NotFound(format!("Reddit returned not found during {}: {}", context, detail))
        }
        StatusCode::TOO_MANY_REQUESTS => PlatformError::RateLimit(format!(
            "Reddit rate limit exceeded during {}: {}",
            context, detail
        )),
        // Unknown communities redirect to the search page
        s if s.is_redirection() => PlatformError::NotFound(format!(
            "Reddit redirected {} request, the community probably does not exist: {}",
            context, status
        )),
        _ => PlatformError::Posting(format!("Reddit {} failed: {}", context, detail)),
    }
}

/// Map a transport-level reqwest failure to a `PlatformError`
fn map_transport(error: reqwest::Error, context: &str) -> PlatformError {
    if error.is_decode() {
        PlatformError::Posting(format!("Unexpected Reddit response during {}: {}", context, error))
    } else {
        PlatformError::Network(format!("Could not reach Reddit during {}: {}", context, error))
    }
}

/// Turn the `errors` array of a submit response into one error
fn map_submit_errors(errors: &[Vec<serde_json::Value>]) -> PlatformError {
    let rendered: Vec<String> = errors
        .iter()
        .map(|entry| {
            entry
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(": ")
        })
        .collect();
    let message = rendered.join("; ");

    let rate_limited = errors
        .iter()
        .any(|entry| entry.first().and_then(|code| code.as_str()) == Some("RATELIMIT"));

    if rate_limited {
        PlatformError::RateLimit(message)
    } else {
        PlatformError::Validation(message)
    }
}

/// Parse a configured base URL, rejecting anything that cannot take a path
fn parse_base(field: &str, raw: &str) -> Result<Url> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: field.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(invalid(format!("{} cannot be used as a base URL", raw)).into());
    }
    Ok(url)
}

/// `base` with each of `segments` appended as one percent-encoded path segment
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Derive a site-relative permalink from the submit response
fn permalink_from(url: Option<&str>, id: &str) -> String {
    match url {
        Some(url) if url.starts_with(REDDIT_WEB_BASE) => url[REDDIT_WEB_BASE.len()..].to_string(),
        Some(url) if url.starts_with("https://reddit.com") => {
            url["https://reddit.com".len()..].to_string()
        }
        Some(url) if url.starts_with('/') => url.to_string(),
        _ => format!("/comments/{}/", id),
    }
}

pub struct RedditClient {
    http: reqwest::Client,
    credentials: RedditCredentials,
    auth_base: Url,
    api_base: Url,
    token: Mutex<Option<AccessToken>>,
}

impl RedditClient {
    /// Create a new Reddit client
    ///
    /// No network traffic happens here; the first call that needs a token
    /// authenticates. Fails with a `ConfigError` when a base URL does not
    /// parse.
    pub fn new(config: RedditConfig) -> Result<Self> {
        let auth_base = parse_base("REDDIT_AUTH_BASE", &config.auth_base)?;
        let api_base = parse_base("REDDIT_API_BASE", &config.api_base)?;

        let http = reqwest::Client::builder()
            .user_agent(config.credentials.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            credentials: config.credentials,
            auth_base,
            api_base,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, requesting a new one when needed
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.expose_secret().to_string());
            }
            tracing::debug!("Reddit access token expired, refreshing");
        }

        let token = self.request_token().await?;
        let value = token.value.expose_secret().to_string();
        *guard = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        tracing::debug!(
            "Requesting Reddit access token for user: {}",
            self.credentials.username
        );

        let form = [
            ("grant_type", "password"),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.expose_secret()),
        ];

        let response = self
            .http
            .post(endpoint(&self.auth_base, &["api", "v1", "access_token"]))
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| map_transport(e, "authentication"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, "authentication", &body).into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PlatformError::Authentication(format!("Unexpected token response: {}", e))
        })?;

        if let Some(error) = token.error {
            return Err(PlatformError::Authentication(format!(
                "Reddit rejected the account credentials: {}",
                error
            ))
            .into());
        }

        let value = token.access_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            PlatformError::Authentication("Token response carried no access_token".to_string())
        })?;
        let lifetime = token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        tracing::debug!("Reddit access token obtained, valid for {}s", lifetime);

        Ok(AccessToken {
            value: SecretString::from(value),
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}

#[async_trait]
impl Platform for RedditClient {
    async fn authenticate(&self) -> Result<()> {
        self.access_token().await.map(|_| ())
    }

    async fn list_flairs(&self, community: &Community) -> Result<Vec<Flair>> {
        let token = self.access_token().await?;

        tracing::debug!("Fetching link flairs for r/{}", community);

        let response = self
            .http
            .get(endpoint(
                &self.api_base,
                &["r", community.as_str(), "api", "link_flair_v2"],
            ))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| map_transport(e, "flair lookup"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, "flair lookup", &body).into());
        }

        let templates: Vec<FlairTemplate> = response
            .json()
            .await
            .map_err(|e| map_transport(e, "flair lookup"))?;

        Ok(templates
            .into_iter()
            .map(|t| Flair::new(t.text.unwrap_or_default(), t.id))
            .collect())
    }

    async fn submit(&self, community: &Community, post: &NewPost) -> Result<Submission> {
        let token = self.access_token().await?;

        let mut form: Vec<(&str, &str)> = vec![
            ("sr", community.as_str()),
            ("title", post.title.as_str()),
            ("kind", post.kind.kind()),
            ("api_type", "json"),
            ("resubmit", "true"),
            ("sendreplies", "true"),
        ];
        match &post.kind {
            PostKind::Text(body) => form.push(("text", body.as_str())),
            PostKind::Link(url) => form.push(("url", url.as_str())),
        }
        if let Some(flair_id) = &post.flair_id {
            form.push(("flair_id", flair_id.as_str()));
        }

        tracing::debug!("Submitting {} post to r/{}", post.kind.kind(), community);

        let response = self
            .http
            .post(endpoint(&self.api_base, &["api", "submit"]))
            .bearer_auth(token)
            .form(&form)
            .send()
            .await
            .map_err(|e| map_transport(e, "posting"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, "posting", &body).into());
        }

        let envelope: SubmitEnvelope = response
            .json()
            .await
            .map_err(|e| map_transport(e, "posting"))?;

        if !envelope.json.errors.is_empty() {
            return Err(map_submit_errors(&envelope.json.errors).into());
        }

        let data = envelope.json.data.ok_or_else(|| {
            PlatformError::Posting("Submit response carried no data".to_string())
        })?;

        let id = data
            .id
            .or_else(|| data.name.map(|n| n.trim_start_matches("t3_").to_string()))
            .ok_or_else(|| PlatformError::Posting("Submit response carried no post id".to_string()))?;
        let permalink = permalink_from(data.url.as_deref(), &id);

        tracing::info!("Posted to r/{}: {}", community, id);

        Ok(Submission { id, permalink })
    }

    fn name(&self) -> &str {
        "reddit"
    }
}
