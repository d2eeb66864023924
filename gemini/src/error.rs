//! Error types for the Gemini API client

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when calling the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Missing `GEMINI_API_KEY` environment variable
    #[error("Missing GEMINI_API_KEY environment variable")]
    MissingApiKey,

    /// Invalid client configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Response parsing failed
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// Rate limited - too many requests
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Unauthorized - invalid API key
    #[error("Unauthorized - invalid API key")]
    Unauthorized,

    /// API returned an error
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// The API returned no candidates
    #[error("Empty response - no candidates returned")]
    EmptyResponse,
}
