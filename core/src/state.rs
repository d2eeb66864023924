//! The shared state threaded through one pipeline run

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::audit::RiskLevel;
use crate::output::{AuditTrail, FinalOutput};

/// JSON object type carried in stage output fields.
pub type JsonMap = Map<String, Value>;

/// Vital sign measurements attached to a clinical request.
///
/// The inbound layer guarantees all four measurements are present; the core
/// does not re-validate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Vitals {
    /// Heart rate in beats per minute
    pub heart_rate: u32,
    /// Blood pressure reading, e.g. "150/95"
    pub blood_pressure: String,
    /// Body temperature in degrees Celsius
    pub temperature: f64,
    /// Peripheral oxygen saturation percentage
    pub oxygen_saturation: u32,
}

/// A validated clinical request, as delivered by the inbound layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClinicalInput {
    /// Patient identifier
    pub patient_id: String,
    /// Patient age in years (0-120, validated upstream)
    pub age: u8,
    /// Patient gender
    pub gender: String,
    /// Free-text symptom description
    pub symptoms: String,
    /// Vital sign measurements
    pub vitals: Vitals,
    /// Lab results, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_results: Option<String>,
    /// Clinical notes, when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
}

/// The single mutable record threaded through one pipeline run.
///
/// Each field is populated by exactly one stage and read only by stages at
/// or after that point in the fixed chain. The pipeline owns the state
/// exclusively for the duration of a run; no concurrent run shares an
/// instance, so plain in-place mutation is safe.
#[derive(Clone, Debug)]
pub struct ClinicalState {
    /// Raw validated request. Set once at construction, never mutated.
    pub input_data: ClinicalInput,
    /// Normalized patient data. Set by the intake stage.
    pub patient_profile: Option<JsonMap>,
    /// Anomalies detected during normalization. Set by the intake stage.
    pub data_quality_flags: Vec<String>,
    /// Probabilistic findings. Set by the clinical knowledge stage.
    pub clinical_insights: Option<JsonMap>,
    /// Risk classification with justification. Set by the risk stage.
    pub risk_assessment: Option<JsonMap>,
    /// Suggested diagnostics and care pathways. Set by the recommendation
    /// stage.
    pub recommendations: Option<JsonMap>,
    /// Rationale trace. Set by the explainability stage.
    pub explanation: Option<JsonMap>,
    /// Whether human sign-off is required. Set by the risk stage.
    pub approval_required: bool,
    /// Request id, timestamp and executed chain. Set by the safety stage.
    pub audit_log: Option<AuditTrail>,
    /// The externally returned projection. Set by the safety stage;
    /// terminal field.
    pub final_output: Option<FinalOutput>,
}

impl ClinicalState {
    /// Create the initial state for one run.
    #[must_use]
    pub const fn new(input: ClinicalInput) -> Self {
        Self {
            input_data: input,
            patient_profile: None,
            data_quality_flags: Vec::new(),
            clinical_insights: None,
            risk_assessment: None,
            recommendations: None,
            explanation: None,
            approval_required: false,
            audit_log: None,
            final_output: None,
        }
    }

    /// Risk level recorded by the risk stage, `Unknown` until set.
    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_assessment
            .as_ref()
            .and_then(|assessment| assessment.get("risk_level"))
            .and_then(Value::as_str)
            .map_or(RiskLevel::Unknown, RiskLevel::from_label)
    }

    /// Snapshot of every field produced so far, as the explainability stage
    /// sees it.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut snapshot = Map::new();
        snapshot.insert(
            "input_data".to_string(),
            serde_json::to_value(&self.input_data).unwrap_or(Value::Null),
        );
        if let Some(profile) = &self.patient_profile {
            snapshot.insert("patient_profile".to_string(), Value::Object(profile.clone()));
        }
        snapshot.insert(
            "data_quality_flags".to_string(),
            Value::Array(
                self.data_quality_flags
                    .iter()
                    .map(|flag| Value::String(flag.clone()))
                    .collect(),
            ),
        );
        if let Some(insights) = &self.clinical_insights {
            snapshot.insert("clinical_insights".to_string(), Value::Object(insights.clone()));
        }
        if let Some(assessment) = &self.risk_assessment {
            snapshot.insert("risk_assessment".to_string(), Value::Object(assessment.clone()));
        }
        if let Some(recommendations) = &self.recommendations {
            snapshot.insert(
                "recommendations".to_string(),
                Value::Object(recommendations.clone()),
            );
        }
        snapshot.insert(
            "approval_required".to_string(),
            Value::Bool(self.approval_required),
        );
        Value::Object(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_input() -> ClinicalInput {
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

    #[test]
    fn test_risk_level_defaults_to_unknown() {
        let state = ClinicalState::new(sample_input());
        assert_eq!(state.risk_level(), RiskLevel::Unknown);
    }

    #[test]
    fn test_risk_level_reads_assessment() {
        let mut state = ClinicalState::new(sample_input());
        let assessment = json!({"risk_level": "HIGH", "justification": "tachycardia with hypoxia"});
        state.risk_assessment = assessment.as_object().cloned();
        assert_eq!(state.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_unrecognized_label_is_unknown() {
        let mut state = ClinicalState::new(sample_input());
        state.risk_assessment = json!({"risk_level": "CRITICAL"}).as_object().cloned();
        assert_eq!(state.risk_level(), RiskLevel::Unknown);
    }

    #[test]
    fn test_snapshot_omits_unproduced_fields() {
        let state = ClinicalState::new(sample_input());
        let snapshot = state.snapshot();

        assert!(snapshot.get("input_data").is_some());
        assert!(snapshot.get("patient_profile").is_none());
        assert!(snapshot.get("risk_assessment").is_none());
        assert_eq!(snapshot["approval_required"], json!(false));
    }

    #[test]
    fn test_snapshot_includes_produced_fields() {
        let mut state = ClinicalState::new(sample_input());
        state.patient_profile = json!({"age": 65}).as_object().cloned();
        state.data_quality_flags = vec!["missing lab results".to_string()];
        state.clinical_insights = json!({"concerns": ["possible hypoxia"]}).as_object().cloned();

        let snapshot = state.snapshot();
        assert_eq!(snapshot["patient_profile"], json!({"age": 65}));
        assert_eq!(snapshot["data_quality_flags"], json!(["missing lab results"]));
        assert_eq!(snapshot["clinical_insights"], json!({"concerns": ["possible hypoxia"]}));
    }

    #[test]
    fn test_input_serializes_without_optional_fields() {
        let value = serde_json::to_value(sample_input()).unwrap();
        assert!(value.get("lab_results").is_none());
        assert!(value.get("clinical_notes").is_none());
        assert_eq!(value["vitals"]["heart_rate"], json!(110));
    }

    #[test]
    fn test_input_round_trips_with_optional_fields() {
        let mut input = sample_input();
        input.lab_results = Some("troponin pending".to_string());

        let value = serde_json::to_value(&input).unwrap();
        let back: ClinicalInput = serde_json::from_value(value).unwrap();
        assert_eq!(back, input);
    }
}
