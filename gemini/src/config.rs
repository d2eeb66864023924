//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Decoding and transport settings for the Gemini client.
///
/// The defaults reproduce the decision-support deployment: a
/// deterministic-leaning temperature and JSON-constrained output, with an
/// explicit request timeout (no external call runs unbounded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model to use
    pub model: String,
    /// Sampling temperature (0.0-1.0); low for reproducible structure
    pub temperature: f32,
    /// Cap on generated tokens, when set
    pub max_output_tokens: Option<u32>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.is_empty() {
            return Err(ConfigError::Validation("model cannot be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::Validation(
                "temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.max_output_tokens == Some(0) {
            return Err(ConfigError::Validation(
                "max_output_tokens must be > 0 when set".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            max_output_tokens: None,
            timeout_secs: 30,
        }
    }
}
