//! The fixed reasoning chain
//!
//! Six stages, executed in a fixed, linear, unconditional order. The five
//! reasoning stages each build a payload from designated state fields, call
//! the [`ReasoningClient`](crate::reasoning::ReasoningClient) with a fixed
//! agent-specific instruction, and write their designated output fields.
//! The final safety stage persists the audit record and assembles the
//! returned projection.
//!
//! The instructions are policy constraints, not style notes: none of the
//! stages diagnoses, the risk stage classifies into exactly one of
//! LOW/MODERATE/HIGH with a conservative bias, and recommendations carry a
//! disclaimer and never include treatment.

pub mod explainability;
pub mod intake;
pub mod knowledge;
pub mod recommendation;
pub mod risk;
pub mod safety;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditError;
use crate::reasoning::ReasoningError;
use crate::state::{ClinicalState, JsonMap};

pub use explainability::ExplainabilityAgent;
pub use intake::IntakeAgent;
pub use knowledge::ClinicalKnowledgeAgent;
pub use recommendation::RecommendationAgent;
pub use risk::RiskAgent;
pub use safety::SafetyAgent;

/// Stage names in execution order, as recorded in audit trails.
pub const AGENT_CHAIN: [&str; 6] = [
    "intake",
    "clinical_knowledge",
    "risk",
    "recommendation",
    "explainability",
    "safety",
];

/// One stage in the fixed reasoning chain.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable stage name, as recorded in audit trails.
    fn name(&self) -> &'static str;

    /// Run the stage, reading and writing its designated state fields.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] when the reasoning call or audit write fails,
    /// or when a depended-on field was never produced.
    async fn run(&self, state: &mut ClinicalState) -> Result<(), AgentError>;
}

/// Error from a single chain stage.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The external reasoning call failed or returned unusable output
    #[error(transparent)]
    Reasoning(#[from] ReasoningError),

    /// The audit write failed
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// A stage ran before the field it depends on was produced
    #[error("stage input `{0}` not yet produced")]
    MissingStageInput(&'static str),

    /// The reasoning reply had the wrong top-level shape for this stage
    #[error("stage `{stage}` expected an object reply, got {kind}")]
    UnexpectedReplyShape {
        /// Stage that received the reply
        stage: &'static str,
        /// JSON kind of the reply
        kind: &'static str,
    },
}

/// Borrow a stage output produced earlier in the chain.
pub(crate) fn required<'a>(
    field: &'a Option<JsonMap>,
    name: &'static str,
) -> Result<&'a JsonMap, AgentError> {
    field.as_ref().ok_or(AgentError::MissingStageInput(name))
}

/// Interpret a stage reply as a JSON object.
///
/// The stage contract is object-shaped output; anything else is unusable
/// downstream.
pub(crate) fn expect_object(stage: &'static str, reply: Value) -> Result<JsonMap, AgentError> {
    match reply {
        Value::Object(map) => Ok(map),
        other => Err(AgentError::UnexpectedReplyShape {
            stage,
            kind: json_kind(&other),
        }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{ReasoningError, Value, async_trait};
    use crate::reasoning::ReasoningClient;
    use crate::state::{ClinicalInput, ClinicalState, Vitals};

    /// Client returning the same fixed reply for every call.
    pub(crate) struct CannedClient(pub Value);

    #[async_trait]
    impl ReasoningClient for CannedClient {
        async fn invoke(
            &self,
            _system_instruction: &str,
            _payload: &Value,
        ) -> Result<Value, ReasoningError> {
            Ok(self.0.clone())
        }
    }

    /// Client that fails every call.
    pub(crate) struct FailingClient;

    #[async_trait]
    impl ReasoningClient for FailingClient {
        async fn invoke(
            &self,
            _system_instruction: &str,
            _payload: &Value,
        ) -> Result<Value, ReasoningError> {
            Err(ReasoningError::CallFailed("connection refused".to_string()))
        }
    }

    pub(crate) fn state() -> ClinicalState {
        ClinicalState::new(ClinicalInput {
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
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_chain_order() {
        assert_eq!(AGENT_CHAIN[0], "intake");
        assert_eq!(AGENT_CHAIN[5], "safety");
        assert_eq!(AGENT_CHAIN.len(), 6);
    }

    #[test]
    fn test_expect_object_accepts_objects() {
        let map = expect_object("risk", json!({"risk_level": "LOW"}));
        assert!(map.is_ok());
    }

    #[test]
    fn test_expect_object_rejects_arrays() {
        let err = expect_object("risk", json!([1, 2, 3]));
        assert!(matches!(
            err,
            Err(AgentError::UnexpectedReplyShape { stage: "risk", kind: "an array" })
        ));
    }

    #[test]
    fn test_required_reports_missing_field() {
        let field = None;
        let err = required(&field, "patient_profile");
        assert!(matches!(err, Err(AgentError::MissingStageInput("patient_profile"))));
    }
}
