//! Error types for the openload client

use thiserror::Error;

/// Result type alias for the openload client
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the openload client
#[derive(Error, Debug)]
pub enum Error {
    /// Client construction errors (missing credentials, bad transport setup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input supplied to an operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local IO error (upload source unreadable)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout
    #[error("Operation timed out")]
    Timeout,

    /// Response body does not match the API envelope
    #[error("Protocol error: {reason} (body: {body})")]
    Protocol { reason: String, body: String },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote service reported a failure status
    #[error("Remote rejected request (status {status}): {message}")]
    RemoteRejection { status: u16, message: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err.to_string())
        }
    }
}
