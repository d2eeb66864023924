//! Risk stratification stage: classification and the approval gate

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use super::{Agent, AgentError, expect_object, required};
use crate::audit::RiskLevel;
use crate::reasoning::ReasoningClient;
use crate::state::ClinicalState;

const INSTRUCTION: &str = "You are a risk stratification agent. \
Classify patient risk as exactly one of LOW, MODERATE, or HIGH and justify \
clearly. Be conservative: on ambiguous input, prefer escalation over \
understatement.";

/// Classifies patient risk and derives the approval gate.
///
/// Reads `patient_profile` and `clinical_insights`; writes
/// `risk_assessment` and `approval_required`.
///
/// A reply that omits `risk_level`, or carries a label outside the three
/// classes, is normalized to `UNKNOWN` with `approval_required = false`.
/// The fallback is written back into the assessment so downstream stages
/// never see the field missing.
pub struct RiskAgent {
    client: Arc<dyn ReasoningClient>,
}

impl RiskAgent {
    /// Create the stage around a reasoning client.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for RiskAgent {
    fn name(&self) -> &'static str {
        "risk"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let profile = required(&state.patient_profile, "patient_profile")?;
        let insights = required(&state.clinical_insights, "clinical_insights")?;
        let payload = json!({
            "profile": profile,
            "insights": insights,
        });

        let reply = self.client.invoke(INSTRUCTION, &payload).await?;
        let mut assessment = expect_object(self.name(), reply)?;

        let level = assessment
            .get("risk_level")
            .and_then(Value::as_str)
            .map_or(RiskLevel::Unknown, RiskLevel::from_label);
        if level == RiskLevel::Unknown {
            warn!("risk stage produced no usable risk_level, recording UNKNOWN");
        }
        assessment.insert(
            "risk_level".to_string(),
            Value::String(level.as_str().to_string()),
        );

        state.approval_required = level.requires_approval();
        state.risk_assessment = Some(assessment);
        Ok(())
    }
}
