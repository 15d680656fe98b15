//! HTTP client for the `sub-serve` service
//!
//! The orchestrator only ever talks to the service through [`PosterApi`], so
//! batch logic can be exercised against an in-memory fake as well as against
//! [`ApiClient`].

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::credentials::BearerToken;
use crate::error::{ClientError, ConfigError, PlatformError, Result};
use crate::types::{Community, Flair, FlairList, PostRequest, PostResponse};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// The two service operations the orchestrator drives
#[async_trait]
pub trait PosterApi: Send + Sync {
    /// `GET /subreddit-flairs/{name}`
    async fn subreddit_flairs(&self, community: &Community) -> ClientResult<Vec<Flair>>;

    /// `POST /post/{name}`
    async fn post(&self, community: &Community, request: &PostRequest) -> ClientResult<PostResponse>;
}

/// Error bodies produced by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    error: Option<String>,
}

/// reqwest-backed client for the service
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: BearerToken,
}

impl ApiClient {
    /// Create a client for the service at `base_url`
    ///
    /// Every request carries `Authorization: Bearer <token>`. Fails with a
    /// `ConfigError` when `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: impl Into<String>, token: BearerToken) -> Result<Self> {
        let base_url = parse_base_url(&base_url.into())?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("sub-batch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Service URL for `segments` under the base URL
    ///
    /// Each segment is percent-encoded, so a community name can never add
    /// path components, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `GET /secure-ping`, used to check the token before a batch starts
    pub async fn secure_ping(&self) -> ClientResult<()> {
        let url = self.endpoint(&["secure-ping"]);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        check_status(response).await.map(|_| ())
    }
}

#[async_trait]
impl PosterApi for ApiClient {
    async fn subreddit_flairs(&self, community: &Community) -> ClientResult<Vec<Flair>> {
        let url = self.endpoint(&["subreddit-flairs", community.as_str()]);
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(self.token.expose())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let list: FlairList = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))?;

        Ok(list.flairs)
    }

    async fn post(&self, community: &Community, request: &PostRequest) -> ClientResult<PostResponse> {
        let url = self.endpoint(&["post", community.as_str()]);
        let response = self
            .http
            .post(url.clone())
            .bearer_auth(self.token.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

/// Parse and check the service base URL
fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        field: "SUBCAST_API_URL".to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("{} is not an http(s) base URL", raw)).into());
    }
    Ok(url)
}

fn transport_error(url: &Url, error: reqwest::Error) -> ClientError {
    tracing::error!("Request to {} failed: {}", url, error);
    ClientError::Transport(error.to_string())
}

/// Pass success responses through; turn anything else into `ClientError::Status`
async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = error_detail(status, &text);
    tracing::warn!("Service answered {}: {}", status, detail);

    Err(ClientError::Status {
        status: status.as_u16(),
        detail,
    })
}

fn error_detail(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: Some(detail),
            ..
        }) => detail,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_detail_prefers_detail_field() {
        let body = r#"{"detail": "Error posting to subreddit: boom"}"#;
        assert_eq!(
            error_detail(StatusCode::BAD_REQUEST, body),
            "Error posting to subreddit: boom"
        );
    }

    #[test]
    fn test_error_detail_reads_error_field() {
        let body = r#"{"error": "handler panicked"}"#;
        assert_eq!(
            error_detail(StatusCode::INTERNAL_SERVER_ERROR, body),
            "handler panicked"
        );
    }

    #[test]
    fn test_error_detail_falls_back_to_text() {
        assert_eq!(error_detail(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_detail(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/", BearerToken::new("t")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_endpoint_encodes_community_names() {
        let client = ApiClient::new("http://localhost:8000", BearerToken::new("t")).unwrap();

        assert_eq!(
            client.endpoint(&["post", "rust"]).as_str(),
            "http://localhost:8000/post/rust"
        );
        assert_eq!(
            client.endpoint(&["post", "rust#x"]).as_str(),
            "http://localhost:8000/post/rust%23x"
        );
        assert_eq!(
            client.endpoint(&["subreddit-flairs", "a?b/c"]).as_str(),
            "http://localhost:8000/subreddit-flairs/a%3Fb%2Fc"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("http://localhost:8000/poster/", BearerToken::new("t")).unwrap();
        assert_eq!(
            client.endpoint(&["secure-ping"]).as_str(),
            "http://localhost:8000/poster/secure-ping"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        for raw in ["localhost:8000", "not a url", "mailto:someone@example.com"] {
            let err = ApiClient::new(raw, BearerToken::new("t")).err().unwrap();
            assert_eq!(err.exit_code(), 2, "{}", raw);
        }
    }
}
