//! Credential holders
//!
//! Secrets are wrapped in `secrecy::SecretString` so they are zeroed on drop
//! and redacted from `Debug` output.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Account and application credentials for the Reddit OAuth "script" flow.
#[derive(Debug)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub user_agent: String,
    pub username: String,
    pub password: SecretString,
}

impl RedditCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        user_agent: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            user_agent: user_agent.into(),
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Shared bearer secret guarding the protected service routes.
#[derive(Debug)]
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for clients that need to send it.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Check a presented token against this one.
    ///
    /// Both sides are hashed first so the comparison always runs over 32
    /// bytes, then folded without early exit.
    pub fn verify(&self, presented: &str) -> bool {
        let expected = Sha256::digest(self.0.expose_secret().as_bytes());
        let actual = Sha256::digest(presented.as_bytes());

        expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matching_token() {
        let token = BearerToken::new("s3cret-token");
        assert!(token.verify("s3cret-token"));
    }

    #[test]
    fn test_verify_rejects_wrong_token() {
        let token = BearerToken::new("s3cret-token");
        assert!(!token.verify("s3cret-tokem"));
        assert!(!token.verify("s3cret"));
        assert!(!token.verify(""));
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let creds = RedditCredentials::new("id", "hunter2", "ua/1.0", "alice", "pa55word");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("pa55word"));
        assert!(debug.contains("alice"));

        let token = BearerToken::new("abc123");
        assert!(!format!("{:?}", token).contains("abc123"));
    }
}
