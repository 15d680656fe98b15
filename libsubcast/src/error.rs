//! Error types for Subcast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SubcastError>;

#[derive(Error, Debug)]
pub enum SubcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Service request failed: {0}")]
    Client(#[from] ClientError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SubcastError::InvalidInput(_) => 3,
            SubcastError::Config(_) => 2,
            SubcastError::Platform(_) => 1,
            SubcastError::Client(_) => 1,
            SubcastError::Io(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failures reported by a platform session.
///
/// The variants only shape log lines and messages; callers never retry on
/// any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Posting failed: {0}")]
    Posting(String),
}

/// Failures talking to the `sub-serve` HTTP service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced a response
    #[error("no response received: {0}")]
    Transport(String),

    /// The service answered with a non-success status
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body was not the JSON we expected
    #[error("malformed response: {0}")]
    Malformed(String),
}
