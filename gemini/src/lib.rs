//! # Gemini Reasoning Client
//!
//! Rust client for the Google Gemini `generateContent` API, implementing
//! the [`ReasoningClient`](clinical_agents_core::ReasoningClient) boundary
//! of the clinical agent chain.
//!
//! Requests are single-turn, low-temperature, and constrained to JSON
//! output (`responseMimeType: application/json`), so every reply parses as
//! structured data or fails loudly. The client holds no state across
//! invocations and never retries; each invoke is exactly one attempt with
//! a bounded request timeout.
//!
//! ## Example
//!
//! ```no_run
//! use clinical_agents_gemini::GeminiClient;
//! use clinical_agents_core::ReasoningClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from GEMINI_API_KEY environment variable
//!     let client = GeminiClient::from_env()?;
//!
//!     let reply = client
//!         .invoke("Return strict JSON.", &json!({"question": "ping"}))
//!         .await?;
//!
//!     println!("Reply: {reply}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::GeminiClient;
pub use config::{ConfigError, GeminiConfig};
pub use error::GeminiError;
pub use types::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
