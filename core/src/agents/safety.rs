//! Safety stage: audit finalization and the returned projection

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{AGENT_CHAIN, Agent, AgentError, required};
use crate::audit::{AuditRecord, AuditSink};
use crate::output::{AuditTrail, FinalOutput};
use crate::state::ClinicalState;

/// Final stage: generates the request id and timestamp, persists the
/// `SUCCESS` audit record, and assembles `final_output`.
///
/// The projection deliberately re-exposes neither `input_data` nor
/// `patient_profile`. A failed audit write fails the stage; a clinical
/// result without a durable trail is unsafe to return.
pub struct SafetyAgent {
    sink: Arc<dyn AuditSink>,
}

impl SafetyAgent {
    /// Create the stage around an audit sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Agent for SafetyAgent {
    fn name(&self) -> &'static str {
        "safety"
    }

    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError> {
        let request_id = Uuid::new_v4();
        let timestamp = Utc::now();
        // The chain is linear and unconditional, so the executed list is
        // the full fixed chain.
        let agent_chain: Vec<String> = AGENT_CHAIN.iter().map(|name| (*name).to_string()).collect();
        let risk_level = state.risk_level();

        info!(
            %request_id,
            risk = %risk_level,
            approval = state.approval_required,
            "clinical request processed"
        );

        // Gather the projection inputs before persisting, so the SUCCESS
        // record is only ever written for a chain that can be returned.
        let risk_summary = required(&state.risk_assessment, "risk_assessment")?.clone();
        let clinical_insights = required(&state.clinical_insights, "clinical_insights")?.clone();
        let recommendations = required(&state.recommendations, "recommendations")?.clone();
        let explanation = required(&state.explanation, "explanation")?.clone();

        self.sink
            .record(AuditRecord::success(
                request_id,
                timestamp,
                risk_level,
                state.approval_required,
                agent_chain.clone(),
            ))
            .await?;

        let trail = AuditTrail {
            request_id,
            timestamp,
            agent_chain,
        };
        state.audit_log = Some(trail.clone());
        state.final_output = Some(FinalOutput {
            risk_summary,
            clinical_insights,
            recommendations,
            explanation,
            approval_required: state.approval_required,
            audit_log: trail,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::state;
    use super::*;
    use crate::audit::{AuditStatus, InMemoryAuditSink, RiskLevel};
    use serde_json::json;

    fn completed_state() -> ClinicalState {
        let mut state = state();
        state.patient_profile = json!({"age": 65}).as_object().cloned();
        state.clinical_insights = json!({"concerns": []}).as_object().cloned();
        state.risk_assessment =
            json!({"risk_level": "HIGH", "justification": "hypoxia"}).as_object().cloned();
        state.approval_required = true;
        state.recommendations = json!({"diagnostics": [], "disclaimer": "x"}).as_object().cloned();
        state.explanation = json!({"reasoning": "x"}).as_object().cloned();
        state
    }

    #[tokio::test]
    async fn test_safety_persists_success_record() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let agent = SafetyAgent::new(Arc::clone(&sink) as Arc<dyn AuditSink>);
        let mut state = completed_state();

        agent.run(&mut state).await.unwrap();

        let records = sink.all().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AuditStatus::Success);
        assert_eq!(records[0].risk_level, RiskLevel::High);
        assert!(records[0].approval_required);
        assert_eq!(records[0].agents_executed, AGENT_CHAIN.map(String::from).to_vec());
    }

    #[tokio::test]
    async fn test_safety_projection_matches_audit_record() {
        let sink = Arc::new(InMemoryAuditSink::new());
        let agent = SafetyAgent::new(Arc::clone(&sink) as Arc<dyn AuditSink>);
        let mut state = completed_state();

        agent.run(&mut state).await.unwrap();

        let output = state.final_output.as_ref().unwrap();
        let record = &sink.all().await[0];
        assert_eq!(output.audit_log.request_id, record.request_id);
        assert_eq!(output.audit_log.timestamp, record.timestamp);
        assert_eq!(state.audit_log.as_ref().unwrap(), &output.audit_log);
        assert!(output.approval_required);
        assert_eq!(output.risk_summary["risk_level"], json!("HIGH"));
    }
}
