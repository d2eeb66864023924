//! Boundary to the external reasoning service

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from the external reasoning service.
#[derive(Debug, Error)]
pub enum ReasoningError {
    /// The upstream call errored or timed out
    #[error("reasoning service call failed: {0}")]
    CallFailed(String),

    /// The reply could not be used as structured data
    #[error("reasoning service returned unusable output: {0}")]
    MalformedOutput(String),
}

/// One call to an external generative model: given a system instruction and
/// a structured payload, return parsed structured data or fail.
///
/// Implementations construct a single-turn request with a
/// deterministic-leaning, low-temperature decoding setting constrained to
/// machine-parseable output (JSON objects or arrays, no free text outside a
/// field). They hold no state across invocations and do not retry; retry
/// policy belongs to the caller.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Issue a single structured-output request.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningError`] when the upstream call errors, times out,
    /// or returns output that is not structured data.
    async fn invoke(&self, system_instruction: &str, payload: &Value)
    -> Result<Value, ReasoningError>;
}
