//! Sample Error Types
//!
//! Error handling shared by the client layer and the demo driver.

use thiserror::Error;

/// Main error type for sample operations
#[derive(Debug, Error)]
pub enum SampleError {
    /// Configuration errors (missing endpoint, missing key, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed before a response arrived
    #[error("Request failed: {0}")]
    Request(String),

    /// Authentication failed
    #[error("Authentication failed: {0}. Check your API key.")]
    Auth(String),

    /// Service answered with a non-success status
    #[error("Service returned status {status}: {message}")]
    Service { status: u16, message: String },

    /// Response parsing failed
    #[error("Response error: {0}")]
    Response(String),

    /// Streaming error
    #[error("Streaming error: {0}")]
    Stream(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Console output failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for SampleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SampleError::Timeout(err.to_string())
        } else if err.is_connect() {
            SampleError::Request(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            SampleError::Response(format!("Failed to decode response: {}", err))
        } else {
            SampleError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SampleError {
    fn from(err: serde_json::Error) -> Self {
        SampleError::Response(format!("JSON parsing error: {}", err))
    }
}

/// Result type alias for sample operations
pub type Result<T> = std::result::Result<T, SampleError>;
