//! Clinical knowledge stage: probabilistic findings

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Agent, AgentError, expect_object, required};
use crate::reasoning::ReasoningClient;
use crate::state::ClinicalState;

const INSTRUCTION: &str = "You are a clinical knowledge agent. \
Identify possible clinical concerns without diagnosis. \
Use probabilistic language only.";

/// Surfaces possible concerns from the normalized profile.
///
/// Reads `patient_profile`; writes `clinical_insights`.
pub struct ClinicalKnowledgeAgent {
    client: Arc<dyn ReasoningClient>,
}

impl ClinicalKnowledgeAgent {
    /// Create the stage around a reasoning client.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for ClinicalKnowledgeAgent {
    fn name(&self) -> &'static str {
        "clinical_knowledge"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let profile = required(&state.patient_profile, "patient_profile")?;
        let payload = Value::Object(profile.clone());

        let reply = self.client.invoke(INSTRUCTION, &payload).await?;
        state.clinical_insights = Some(expect_object(self.name(), reply)?);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::{CannedClient, state};
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_knowledge_writes_insights() {
        let agent = ClinicalKnowledgeAgent::new(Arc::new(CannedClient(json!({
            "concerns": ["possible cardiopulmonary compromise"],
            "confidence": "moderate",
        }))));
        let mut state = state();
        state.patient_profile = json!({"age": 65}).as_object().cloned();

        agent.run(&mut state).await.unwrap();

        assert_eq!(
            state.clinical_insights.as_ref().unwrap()["confidence"],
            json!("moderate")
        );
    }

    #[tokio::test]
    async fn test_knowledge_requires_profile() {
        let agent = ClinicalKnowledgeAgent::new(Arc::new(CannedClient(json!({}))));
        let mut state = state();

        let err = agent.run(&mut state).await;
        assert!(matches!(
            err,
            Err(AgentError::MissingStageInput("patient_profile"))
        ));
    }
}
