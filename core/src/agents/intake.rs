//! Intake stage: normalization and data-quality flagging

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Agent, AgentError, expect_object};
use crate::reasoning::ReasoningClient;
use crate::state::ClinicalState;

const INSTRUCTION: &str = "You are a clinical data normalization agent. \
Validate input, normalize vitals, flag missing or abnormal data. \
Do not diagnose. Return strict JSON.";

/// Normalizes the raw request into a patient profile and flags anomalies.
///
/// Reads `input_data`; writes `patient_profile` and `data_quality_flags`.
pub struct IntakeAgent {
    client: Arc<dyn ReasoningClient>,
}

impl IntakeAgent {
    /// Create the stage around a reasoning client.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for IntakeAgent {
    fn name(&self) -> &'static str {
        "intake"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let payload = serde_json::to_value(&state.input_data).unwrap_or(Value::Null);
        let reply = self.client.invoke(INSTRUCTION, &payload).await?;
        let reply = expect_object(self.name(), reply)?;

        // Absent keys degrade to empty, not to a failure: a profile the
        // model chose not to populate is itself a data-quality signal.
        state.patient_profile = Some(
            reply
                .get("patient_profile")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        );
        state.data_quality_flags = reply
            .get("data_quality_flags")
            .and_then(Value::as_array)
            .map(|flags| {
                flags
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        debug!(flags = state.data_quality_flags.len(), "intake complete");
        Ok(())
    }
}
