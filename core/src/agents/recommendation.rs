//! Recommendation stage: diagnostics and care pathways only

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{Agent, AgentError, expect_object, required};
use crate::reasoning::ReasoningClient;
use crate::state::ClinicalState;

const INSTRUCTION: &str = "You are a clinical decision-support agent. \
Suggest diagnostic tests and care pathways only. Never suggest treatment. \
Include a disclaimer field.";

/// Suggests diagnostics and pathways for the assessed risk.
///
/// Reads `risk_assessment` and `clinical_insights`; writes
/// `recommendations`.
pub struct RecommendationAgent {
    client: Arc<dyn ReasoningClient>,
}

impl RecommendationAgent {
    /// Create the stage around a reasoning client.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for RecommendationAgent {
    fn name(&self) -> &'static str {
        "recommendation"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let risk = required(&state.risk_assessment, "risk_assessment")?;
        let insights = required(&state.clinical_insights, "clinical_insights")?;
        let payload = json!({
            "risk": risk,
            "insights": insights,
        });

        let reply = self.client.invoke(INSTRUCTION, &payload).await?;
        state.recommendations = Some(expect_object(self.name(), reply)?);
        Ok(())
    }
}
