//! The externally returned result of a completed run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::JsonMap;

/// Request id, capture timestamp and executed chain for one run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditTrail {
    /// Unique id for this request
    pub request_id: Uuid,
    /// Capture time, UTC
    pub timestamp: DateTime<Utc>,
    /// Stage names, in execution order
    pub agent_chain: Vec<String>,
}

/// The fixed projection returned to the caller.
///
/// Serializes to exactly six keys. Raw input and the normalized patient
/// profile are deliberately not re-exposed, keeping the returned
/// PHI-adjacent surface minimal.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FinalOutput {
    /// Risk classification with justification, from the risk stage
    pub risk_summary: JsonMap,
    /// Probabilistic findings, from the clinical knowledge stage
    pub clinical_insights: JsonMap,
    /// Suggested diagnostics and pathways, from the recommendation stage
    pub recommendations: JsonMap,
    /// Rationale trace, from the explainability stage
    pub explanation: JsonMap,
    /// The risk gate
    pub approval_required: bool,
    /// Audit metadata for this run
    pub audit_log: AuditTrail,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_output_serializes_to_six_keys() {
        let output = FinalOutput {
            risk_summary: json!({"risk_level": "LOW"}).as_object().cloned().unwrap(),
            clinical_insights: JsonMap::new(),
            recommendations: JsonMap::new(),
            explanation: JsonMap::new(),
            approval_required: false,
            audit_log: AuditTrail {
                request_id: Uuid::new_v4(),
                timestamp: Utc::now(),
                agent_chain: vec!["intake".to_string()],
            },
        };

        let value = serde_json::to_value(&output).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "risk_summary",
                "clinical_insights",
                "recommendations",
                "explanation",
                "approval_required",
                "audit_log",
            ]
        );
    }
}
