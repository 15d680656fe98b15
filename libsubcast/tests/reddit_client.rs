//! Integration tests for the Reddit platform client
//!
//! A local httpmock server stands in for both the token endpoint and the
//! OAuth API.

use httpmock::prelude::*;
use libsubcast::config::RedditConfig;
use libsubcast::platforms::reddit::RedditClient;
use libsubcast::platforms::{NewPost, Platform};
use libsubcast::{Community, PlatformError, PostKind, SubcastError, RedditCredentials};
use serde_json::json;

fn client_for(server: &MockServer) -> RedditClient {
    let config = RedditConfig {
        credentials: RedditCredentials::new(
            "client-id",
            "client-secret",
            "subcast-test/0.1",
            "alice",
            "pa55word",
        ),
        auth_base: server.base_url(),
        api_base: server.base_url(),
    };
    RedditClient::new(config).unwrap()
}

async fn mock_token(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/access_token")
                .header_exists("authorization")
                .body_contains("grant_type=password")
                .body_contains("username=alice");
            then.status(200).json_body(json!({
                "access_token": "tok-1",
                "token_type": "bearer",
                "expires_in": 3600,
                "scope": "*"
            }));
        })
        .await
}

fn text_post(flair: Option<&str>) -> NewPost {
    NewPost {
        title: "Hello".to_string(),
        kind: PostKind::Text("World".to_string()),
        flair_id: flair.map(str::to_string),
    }
}

fn platform_error(err: SubcastError) -> PlatformError {
    match err {
        SubcastError::Platform(e) => e,
        other => panic!("Expected platform error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_list_flairs_maps_templates() {
    let server = MockServer::start_async().await;
    let token = mock_token(&server).await;
    let flairs = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/r/rust/api/link_flair_v2")
                .header("authorization", "Bearer tok-1")
                .header("user-agent", "subcast-test/0.1");
            then.status(200).json_body(json!([
                {"id": "f1", "text": "Discussion", "type": "text", "text_editable": false},
                {"id": "f2", "text": "News", "type": "richtext", "richtext": []},
                {"id": "f3", "type": "text"}
            ]));
        })
        .await;

    let client = client_for(&server);
    let result = client.list_flairs(&Community::new("r/rust")).await.unwrap();

    assert_eq!(result.len(), 3);
    assert_eq!(result[0].flair_text, "Discussion");
    assert_eq!(result[0].flair_id, "f1");
    assert_eq!(result[2].flair_text, "");
    token.assert_async().await;
    flairs.assert_async().await;
}

#[tokio::test]
async fn test_token_is_cached_between_calls() {
    let server = MockServer::start_async().await;
    let token = mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r/rust/api/link_flair_v2");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client_for(&server);
    client.authenticate().await.unwrap();
    client.list_flairs(&Community::new("rust")).await.unwrap();
    client.list_flairs(&Community::new("rust")).await.unwrap();

    token.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_invalid_grant_is_authentication_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(200).json_body(json!({"error": "invalid_grant"}));
        })
        .await;

    let client = client_for(&server);
    let err = platform_error(client.authenticate().await.unwrap_err());

    match err {
        PlatformError::Authentication(msg) => assert!(msg.contains("invalid_grant")),
        other => panic!("Expected Authentication, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_client_credentials_are_authentication_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/access_token");
            then.status(401).body(r#"{"message": "Unauthorized", "error": 401}"#);
        })
        .await;

    let client = client_for(&server);
    let err = platform_error(client.authenticate().await.unwrap_err());
    assert!(matches!(err, PlatformError::Authentication(_)));
}

#[tokio::test]
async fn test_unknown_community_redirect_is_not_found() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/r/doesnotexist/api/link_flair_v2");
            then.status(302)
                .header("location", "/subreddits/search.json?q=doesnotexist");
        })
        .await;

    let client = client_for(&server);
    let err = platform_error(
        client
            .list_flairs(&Community::new("doesnotexist"))
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, PlatformError::NotFound(_)));
}

#[tokio::test]
async fn test_submit_text_post() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/submit")
                .header("authorization", "Bearer tok-1")
                .body_contains("sr=rust")
                .body_contains("kind=self")
                .body_contains("text=World")
                .body_contains("flair_id=f1")
                .body_contains("api_type=json");
            then.status(200).json_body(json!({
                "json": {
                    "errors": [],
                    "data": {
                        "url": "https://www.reddit.com/r/rust/comments/abc123/hello/",
                        "drafts_count": 0,
                        "id": "abc123",
                        "name": "t3_abc123"
                    }
                }
            }));
        })
        .await;

    let client = client_for(&server);
    let submission = client
        .submit(&Community::new("rust"), &text_post(Some("f1")))
        .await
        .unwrap();

    assert_eq!(submission.id, "abc123");
    assert_eq!(submission.permalink, "/r/rust/comments/abc123/hello/");
    assert_eq!(
        submission.url(),
        "https://www.reddit.com/r/rust/comments/abc123/hello/"
    );
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submit_link_post() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/submit")
                .body_contains("kind=link")
                .body_contains("url=https%3A%2F%2Fexample.com");
            then.status(200).json_body(json!({
                "json": {"errors": [], "data": {"id": "def456", "name": "t3_def456",
                    "url": "https://www.reddit.com/r/rust/comments/def456/hello/"}}
            }));
        })
        .await;

    let post = NewPost {
        title: "Hello".to_string(),
        kind: PostKind::Link("https://example.com".to_string()),
        flair_id: None,
    };

    let client = client_for(&server);
    let submission = client.submit(&Community::new("rust"), &post).await.unwrap();
    assert_eq!(submission.id, "def456");
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submit_errors_are_reported() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/submit");
            then.status(200).json_body(json!({
                "json": {"errors": [
                    ["SUBMIT_VALIDATION_FLAIR_REQUIRED", "Your post must contain post flair.", "flair"]
                ]}
            }));
        })
        .await;

    let client = client_for(&server);
    let err = platform_error(
        client
            .submit(&Community::new("strict"), &text_post(None))
            .await
            .unwrap_err(),
    );

    match err {
        PlatformError::Validation(msg) => {
            assert!(msg.contains("SUBMIT_VALIDATION_FLAIR_REQUIRED"));
            assert!(msg.contains("Your post must contain post flair."));
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_rate_limited() {
    let server = MockServer::start_async().await;
    mock_token(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/submit");
            then.status(429).body("Too Many Requests");
        })
        .await;

    let client = client_for(&server);
    let err = platform_error(
        client
            .submit(&Community::new("rust"), &text_post(None))
            .await
            .unwrap_err(),
    );
    assert!(matches!(err, PlatformError::RateLimit(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let config = RedditConfig {
        credentials: RedditCredentials::new("id", "secret", "ua", "alice", "pw"),
        // Port 9 (discard) is not listening on test hosts
        auth_base: "http://127.0.0.1:9".to_string(),
        api_base: "http://127.0.0.1:9".to_string(),
    };
    let client = RedditClient::new(config).unwrap();

    let err = platform_error(client.authenticate().await.unwrap_err());
    assert!(matches!(err, PlatformError::Network(_)));
}
