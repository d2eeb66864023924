//! Audit records and the durable sink boundary
//!
//! Every pipeline run leaves exactly one [`AuditRecord`]: `SUCCESS` written
//! by the safety stage, `FAILURE` written by the pipeline on abort. Records
//! are immutable once written and keyed by a unique request id.
//!
//! [`InMemoryAuditSink`] ships for development and testing; durable
//! backends are external collaborators behind the [`AuditSink`] trait.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Patient risk classification produced by the risk stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Routine presentation
    Low,
    /// Elevated concern
    Moderate,
    /// Requires human sign-off before use
    High,
    /// The risk stage produced no usable classification
    Unknown,
}

impl RiskLevel {
    /// Parse a risk label, treating anything unrecognized as `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "LOW" => Self::Low,
            "MODERATE" => Self::Moderate,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        }
    }

    /// Wire label for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// The risk gate: only `HIGH` classifications require approval.
    #[must_use]
    pub const fn requires_approval(self) -> bool {
        matches!(self, Self::High)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// The full chain completed and the output was returned
    Success,
    /// A stage failed and the chain aborted
    Failure,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// Durable, per-request trail of what ran and what risk level resulted.
///
/// Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique id for this request
    pub request_id: Uuid,
    /// Capture time, UTC
    pub timestamp: DateTime<Utc>,
    /// Risk classification at the time of the record
    pub risk_level: RiskLevel,
    /// Whether the risk gate required human sign-off
    pub approval_required: bool,
    /// Stage names executed, in order
    pub agents_executed: Vec<String>,
    /// Run outcome
    pub status: AuditStatus,
    /// Failure detail, present only on `FAILURE` records
    pub error_message: Option<String>,
}

impl AuditRecord {
    /// Record for a completed run. The id and timestamp are supplied by the
    /// safety stage so the persisted record and the returned audit trail
    /// agree.
    #[must_use]
    pub const fn success(
        request_id: Uuid,
        timestamp: DateTime<Utc>,
        risk_level: RiskLevel,
        approval_required: bool,
        agents_executed: Vec<String>,
    ) -> Self {
        Self {
            request_id,
            timestamp,
            risk_level,
            approval_required,
            agents_executed,
            status: AuditStatus::Success,
            error_message: None,
        }
    }

    /// Record for an aborted run, with a fresh request id.
    #[must_use]
    pub fn failure(
        risk_level: RiskLevel,
        approval_required: bool,
        agents_executed: Vec<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            risk_level,
            approval_required,
            agents_executed,
            status: AuditStatus::Failure,
            error_message: Some(error_message.into()),
        }
    }
}

/// Audit persistence error.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to serialize the record
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failed to store the record
    #[error("storage error: {0}")]
    Storage(String),
}

/// Durable store for per-request audit records.
///
/// External collaborator boundary: one record per request id. A failed
/// write after a successful reasoning chain is an overall run failure; a
/// clinical result without a durable trail is unsafe to return.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one audit record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the record cannot be persisted.
    async fn record(&self, record: AuditRecord) -> Result<(), AuditError>;
}

/// In-memory audit sink (for testing/development).
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// All records written so far.
    pub async fn all(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Number of records written.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Look up a record by request id.
    pub async fn find(&self, request_id: Uuid) -> Option<AuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.request_id == request_id)
            .cloned()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.records.write().await.push(record);
        Ok(())
    }
}
