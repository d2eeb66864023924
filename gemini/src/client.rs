//! Gemini API client implementation

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use clinical_agents_core::{ReasoningClient, ReasoningError};

use crate::{
    config::GeminiConfig,
    error::GeminiError,
    types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig},
};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API client.
///
/// Holds no request state across invocations; every call is a single
/// attempt bounded by the configured timeout. Retry policy belongs to the
/// caller, and the chain's policy is zero retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client with API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::MissingApiKey`] if `GEMINI_API_KEY` is not
    /// set, or a configuration/transport error from client construction.
    pub fn from_env() -> Result<Self, GeminiError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| GeminiError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Create a new client with an explicit API key and default settings.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError`] if the HTTP client cannot be constructed.
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a new client with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError`] if the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn with_config(api_key: String, config: GeminiConfig) -> Result<Self, GeminiError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GeminiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            config,
        })
    }

    /// Override the API base URL (proxies, tests).
    #[must_use]
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Issue one generateContent call.
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, timeouts, API errors, or
    /// response parsing failures.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_text: String,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let request = GenerateContentRequest {
            system_instruction: Content::system(system_instruction),
            contents: vec![Content::user(user_text)],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.api_url, self.config.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeminiError::Timeout(self.config.timeout_secs)
                } else {
                    GeminiError::RequestFailed(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::OK => response
                .json::<GenerateContentResponse>()
                .await
                .map_err(|e| GeminiError::ResponseParseFailed(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(GeminiError::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GeminiError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GeminiError::ApiError {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }
}

impl From<GeminiError> for ReasoningError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::ResponseParseFailed(msg) => Self::MalformedOutput(msg),
            GeminiError::EmptyResponse => Self::MalformedOutput(err.to_string()),
            other => Self::CallFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl ReasoningClient for GeminiClient {
    async fn invoke(
        &self,
        system_instruction: &str,
        payload: &Value,
    ) -> Result<Value, ReasoningError> {
        let response = self
            .generate(system_instruction, payload.to_string())
            .await
            .map_err(ReasoningError::from)?;

        let text = response
            .text()
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ReasoningError::from(GeminiError::EmptyResponse))?;

        debug!(bytes = text.len(), "gemini reply received");

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ReasoningError::MalformedOutput(e.to_string()))?;

        // The contract is structured data only: objects or arrays, no bare
        // scalars even when they are valid JSON.
        if value.is_object() || value.is_array() {
            Ok(value)
        } else {
            Err(ReasoningError::MalformedOutput(format!(
                "expected a JSON object or array, got: {text}"
            )))
        }
    }
}
