//! Sequential driver for the fixed agent chain
//!
//! One run is a straight-line state machine: pending → running stage 0..5 →
//! completed, or failed at the first stage error. A stage runs only after
//! the previous stage returned without error, so every write is visible to
//! the stages that follow. There is no partial-success terminal state and
//! no intra-request parallelism; stages have true data dependencies.
//!
//! The chain is linear and static, so the driver is a plain ordered list of
//! stages rather than a general graph scheduler.

use std::sync::Arc;

use thiserror::Error;
use tracing::{Instrument, error, info_span};

use crate::agents::{
    Agent, AgentError, ClinicalKnowledgeAgent, ExplainabilityAgent, IntakeAgent,
    RecommendationAgent, RiskAgent, SafetyAgent,
};
use crate::audit::{AuditError, AuditRecord, AuditSink};
use crate::output::FinalOutput;
use crate::reasoning::ReasoningClient;
use crate::state::{ClinicalInput, ClinicalState};

/// Error surfaced to the caller when a run aborts.
///
/// The display form carries internal detail for the operator log; callers
/// relay [`PipelineError::public_message`] instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A reasoning stage failed; no later stage ran
    #[error("stage `{stage}` failed: {source}")]
    Stage {
        /// Stage at which the chain aborted
        stage: &'static str,
        /// Underlying stage error
        source: AgentError,
    },

    /// The reasoning chain succeeded but the audit write did not; the
    /// result is unsafe to return without a durable trail
    #[error("audit persistence failed: {0}")]
    AuditPersistence(#[from] AuditError),

    /// The chain completed without producing an output (unreachable under
    /// the fixed chain; kept so the driver never has to panic)
    #[error("chain completed without producing a final output")]
    MissingOutput,
}

impl PipelineError {
    /// Generic caller-facing signal. Internal reasoning content and stage
    /// detail stay out of responses; operators get the full error from the
    /// logs.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        "Internal processing error"
    }
}

/// The ordered, fixed, linear chain of agents for one request class.
///
/// Owns execution: each run gets its own [`ClinicalState`], stages execute
/// strictly in order, and the first failure aborts the remainder. Distinct
/// requests may run concurrently; no state is shared between runs.
pub struct Pipeline {
    stages: Vec<Box<dyn Agent>>,
    sink: Arc<dyn AuditSink>,
}

impl Pipeline {
    /// Build the fixed chain around a reasoning client and an audit sink.
    #[must_use]
    pub fn new(client: Arc<dyn ReasoningClient>, sink: Arc<dyn AuditSink>) -> Self {
        let stages: Vec<Box<dyn Agent>> = vec![
            Box::new(IntakeAgent::new(Arc::clone(&client))),
            Box::new(ClinicalKnowledgeAgent::new(Arc::clone(&client))),
            Box::new(RiskAgent::new(Arc::clone(&client))),
            Box::new(RecommendationAgent::new(Arc::clone(&client))),
            Box::new(ExplainabilityAgent::new(client)),
            Box::new(SafetyAgent::new(Arc::clone(&sink))),
        ];
        Self { stages, sink }
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run the chain to completion over one validated request.
    ///
    /// Fail-fast: the first stage error aborts the run, a `FAILURE` audit
    /// record is attempted so the request still leaves a trail, and the
    /// error is returned. No partial output is ever produced.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when any stage fails or the audit write
    /// cannot be completed.
    pub async fn run(&self, input: ClinicalInput) -> Result<FinalOutput, PipelineError> {
        let mut state = ClinicalState::new(input);
        let mut executed: Vec<String> = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            executed.push(stage.name().to_string());

            let span = info_span!("agent", stage = stage.name());
            if let Err(err) = stage.run(&mut state).instrument(span).await {
                error!(stage = stage.name(), error = %err, "chain aborted");
                self.record_failure(&state, executed, &err).await;

                return Err(match err {
                    AgentError::Audit(audit_err) => PipelineError::AuditPersistence(audit_err),
                    other => PipelineError::Stage {
                        stage: stage.name(),
                        source: other,
                    },
                });
            }
        }

        state.final_output.take().ok_or(PipelineError::MissingOutput)
    }

    /// Best-effort `FAILURE` record so every run leaves an audit trail. A
    /// failing failure-write is logged and must not mask the stage error.
    async fn record_failure(&self, state: &ClinicalState, executed: Vec<String>, err: &AgentError) {
        let record = AuditRecord::failure(
            state.risk_level(),
            state.approval_required,
            executed,
            err.to_string(),
        );
        if let Err(sink_err) = self.sink.record(record).await {
            error!(error = %sink_err, "failure audit record could not be written");
        }
    }
}
