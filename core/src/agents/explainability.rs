//! Explainability stage: faithful rationale for the chain's conclusions

use std::sync::Arc;

use async_trait::async_trait;

use super::{Agent, AgentError, expect_object};
use crate::reasoning::ReasoningClient;
use crate::state::ClinicalState;

const INSTRUCTION: &str = "You explain clinical AI reasoning clearly and \
transparently. Stay faithful to the reasoning chain; introduce no new \
claims. No diagnosis.";

/// Explains how the chain reached its conclusions.
///
/// Reads a snapshot of the full state produced so far; writes
/// `explanation`.
pub struct ExplainabilityAgent {
    client: Arc<dyn ReasoningClient>,
}

impl ExplainabilityAgent {
    /// Create the stage around a reasoning client.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Agent for ExplainabilityAgent {
    fn name(&self) -> &'static str {
        "explainability"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let payload = state.snapshot();
        let reply = self.client.invoke(INSTRUCTION, &payload).await?;
        state.explanation = Some(expect_object(self.name(), reply)?);
        Ok(())
    }
}
