//! Request and response types for the generateContent API

use serde::{Deserialize, Serialize};

/// Request to generate content.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// System instruction fixed for the whole request
    pub system_instruction: Content,
    /// Single-turn conversation contents
    pub contents: Vec<Content>,
    /// Decoding settings
    pub generation_config: GenerationConfig,
}

/// A content block: an optional role plus ordered parts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    /// Role of the content producer ("user"/"model"); absent for system
    /// instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Ordered content parts
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user content block with a single text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Create a role-less content block, as system instructions are sent.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// A single text part.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    /// The text content
    pub text: String,
}

/// Decoding settings for a request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,
    /// Output MIME type constraint (e.g. "application/json")
    pub response_mime_type: String,
    /// Cap on generated tokens, when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// Response from generating content.
#[derive(Clone, Debug, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates; the first is the reply
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content
    pub content: Content,
    /// Why generation stopped, when reported
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, `None` when the
    /// response carries no candidates.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.candidates.first().map(|candidate| {
            candidate
                .content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
    }
}
