//! Configuration management for Subcast
//!
//! Everything comes from environment variables. A `.env` file in the working
//! directory is loaded first when present.

use std::net::SocketAddr;

use crate::credentials::{BearerToken, RedditCredentials};
use crate::error::{ConfigError, Result};

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration for the `sub-serve` process.
#[derive(Debug)]
pub struct Config {
    pub reddit: RedditConfig,
    pub server: ServerConfig,
}

#[derive(Debug)]
pub struct RedditConfig {
    pub credentials: RedditCredentials,
    /// Where access tokens are requested
    pub auth_base: String,
    /// Where authenticated API calls go
    pub api_base: String,
}

#[derive(Debug)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub bearer_token: BearerToken,
}

impl Config {
    /// Load configuration from the process environment (and `.env`)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Every missing required key is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &str| match lookup(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        };

        let client_id = required("REDDIT_CLIENT_ID");
        let client_secret = required("REDDIT_CLIENT_SECRET");
        let user_agent = required("REDDIT_USER_AGENT");
        let username = required("REDDIT_USERNAME");
        let password = required("REDDIT_PASSWORD");
        let bearer_token = required("BEARER_TOKEN");

        if !missing.is_empty() {
            return Err(ConfigError::MissingField(missing.join(", ")).into());
        }

        let bind_raw = lookup("SUBCAST_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "SUBCAST_BIND".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            reddit: RedditConfig {
                credentials: RedditCredentials::new(
                    client_id,
                    client_secret,
                    user_agent,
                    username,
                    password,
                ),
                auth_base: base_url(lookup("REDDIT_AUTH_BASE"), DEFAULT_AUTH_BASE),
                api_base: base_url(lookup("REDDIT_API_BASE"), DEFAULT_API_BASE),
            },
            server: ServerConfig {
                bind,
                bearer_token: BearerToken::new(bearer_token),
            },
        })
    }
}

fn base_url(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
