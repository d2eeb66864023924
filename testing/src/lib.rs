//! # Clinical Agents Testing
//!
//! Deterministic test doubles for the clinical agent chain.
//!
//! This crate provides:
//! - A scripted reasoning client that replays canned stage replies in call
//!   order and records what it was asked
//! - An audit sink that always fails its writes
//! - Builders for the sample request and happy-path stage scripts used
//!   across the workspace's tests
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use clinical_agents_core::{AuditSink, InMemoryAuditSink, Pipeline};
//! use clinical_agents_testing::{happy_path_script, mocks::ScriptedReasoningClient, sample_input};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ScriptedReasoningClient::with_script(happy_path_script("HIGH")));
//! let sink = Arc::new(InMemoryAuditSink::new());
//! let pipeline = Pipeline::new(client, Arc::clone(&sink) as Arc<dyn AuditSink>);
//!
//! let output = pipeline.run(sample_input()).await?;
//! assert!(output.approval_required);
//! # Ok(())
//! # }
//! ```

use clinical_agents_core::{ClinicalInput, ReasoningError, Vitals};
use serde_json::{Value, json};

/// Mock implementations of the chain's external boundaries.
pub mod mocks {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use clinical_agents_core::{
        AuditError, AuditRecord, AuditSink, ReasoningClient, ReasoningError,
    };
    use serde_json::Value;
    use tokio::sync::Mutex;

    /// Reasoning client replaying a fixed script of replies in call order.
    ///
    /// The chain's stage order is fixed, so scripting replies positionally
    /// both drives the run and asserts the order. An exhausted script fails
    /// the call, which catches runs that invoke more stages than expected.
    pub struct ScriptedReasoningClient {
        script: Mutex<VecDeque<Result<Value, ReasoningError>>>,
        instructions: Mutex<Vec<String>>,
    }

    impl ScriptedReasoningClient {
        /// Create a client that replays `script` front to back.
        #[must_use]
        pub fn with_script(script: Vec<Result<Value, ReasoningError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                instructions: Mutex::new(Vec::new()),
            }
        }

        /// Number of invocations so far.
        pub async fn call_count(&self) -> usize {
            self.instructions.lock().await.len()
        }

        /// System instructions received, in call order.
        pub async fn instructions(&self) -> Vec<String> {
            self.instructions.lock().await.clone()
        }
    }

    #[async_trait]
    impl ReasoningClient for ScriptedReasoningClient {
        async fn invoke(
            &self,
            system_instruction: &str,
            _payload: &Value,
        ) -> Result<Value, ReasoningError> {
            self.instructions
                .lock()
                .await
                .push(system_instruction.to_string());
            self.script
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(ReasoningError::CallFailed("script exhausted".to_string())))
        }
    }

    /// Audit sink whose writes always fail.
    #[derive(Debug, Default)]
    pub struct FailingAuditSink;

    impl FailingAuditSink {
        /// Create the failing sink.
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl AuditSink for FailingAuditSink {
        async fn record(&self, _record: AuditRecord) -> Result<(), AuditError> {
            Err(AuditError::Storage("audit store unavailable".to_string()))
        }
    }
}

/// The 65-year-old shortness-of-breath request used across tests.
#[must_use]
pub fn sample_input() -> ClinicalInput {
    ClinicalInput {
        patient_id: "P001".to_string(),
        age: 65,
        gender: "male".to_string(),
        symptoms: "shortness of breath".to_string(),
        vitals: Vitals {
            heart_rate: 110,
            blood_pressure: "150/95".to_string(),
            temperature: 37.8,
            oxygen_saturation: 91,
        },
        lab_results: None,
        clinical_notes: None,
    }
}

/// Canned replies for the five reasoning stages of one successful run,
/// with the risk stage reporting `risk_level`.
#[must_use]
pub fn happy_path_script(risk_level: &str) -> Vec<Result<Value, ReasoningError>> {
    vec![
        Ok(json!({
            "patient_profile": {
                "age": 65,
                "heart_rate_bpm": 110,
                "oxygen_saturation_pct": 91,
            },
            "data_quality_flags": ["oxygen_saturation below normal range"],
        })),
        Ok(json!({
            "concerns": ["possible cardiopulmonary compromise"],
            "language": "probabilistic",
        })),
        Ok(json!({
            "risk_level": risk_level,
            "justification": "tachycardia with borderline hypoxia",
        })),
        Ok(json!({
            "diagnostics": ["ECG", "chest X-ray", "arterial blood gas"],
            "care_pathways": ["urgent clinical review"],
            "disclaimer": "Decision support only; not a diagnosis.",
        })),
        Ok(json!({
            "reasoning": "Classification follows from abnormal vitals and flagged concerns.",
        })),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::mocks::ScriptedReasoningClient;
    use super::*;
    use clinical_agents_core::ReasoningClient;

    #[tokio::test]
    async fn test_script_replays_in_order() {
        let client = ScriptedReasoningClient::with_script(vec![
            Ok(json!({"first": true})),
            Err(ReasoningError::CallFailed("down".to_string())),
        ]);

        let first = client.invoke("one", &json!({})).await.unwrap();
        assert_eq!(first, json!({"first": true}));

        let second = client.invoke("two", &json!({})).await;
        assert!(second.is_err());

        assert_eq!(client.call_count().await, 2);
        assert_eq!(client.instructions().await, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails_the_call() {
        let client = ScriptedReasoningClient::with_script(vec![]);
        let result = client.invoke("anything", &json!({})).await;
        assert!(matches!(result, Err(ReasoningError::CallFailed(_))));
    }

    #[test]
    fn test_happy_path_script_covers_five_stages() {
        let script = happy_path_script("LOW");
        assert_eq!(script.len(), 5);
        assert!(script.iter().all(Result::is_ok));
    }
}
