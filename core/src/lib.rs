//! # Clinical Agents Core
//!
//! Agent-chain orchestrator for clinical decision support.
//!
//! A single validated clinical request is threaded through a fixed, linear
//! chain of reasoning stages (intake → clinical knowledge → risk →
//! recommendation → explainability → safety), each stage calling an external
//! reasoning service and writing its designated fields of a shared
//! [`ClinicalState`]. The final safety stage persists an audit record and
//! assembles the risk-gated output returned to the caller.
//!
//! ## Core Concepts
//!
//! - **State**: [`ClinicalState`], owned by the pipeline for one run,
//!   write-once-per-stage
//! - **Agent**: one chain stage, `run(state) -> state` over the reasoning
//!   boundary
//! - **Pipeline**: the sequential fail-fast driver
//! - **Risk gate**: `approval_required`, true exactly when the risk stage
//!   classifies the request `HIGH`
//! - **Audit trail**: one durable [`AuditRecord`] per run, success or failure
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clinical_agents_core::{InMemoryAuditSink, Pipeline};
//!
//! let client = Arc::new(my_reasoning_client);
//! let sink = Arc::new(InMemoryAuditSink::new());
//! let pipeline = Pipeline::new(client, sink);
//!
//! let output = pipeline.run(input).await?;
//! assert_eq!(output.approval_required, output.risk_summary["risk_level"] == "HIGH");
//! ```
//!
//! The HTTP layer, API-key authentication, rate limiting and durable audit
//! storage are external collaborators; this crate defines only their
//! boundaries ([`ReasoningClient`], [`AuditSink`]).

pub mod agents;
pub mod audit;
pub mod output;
pub mod pipeline;
pub mod reasoning;
pub mod state;

// Re-export main types for convenience
pub use agents::{AGENT_CHAIN, Agent, AgentError};
pub use audit::{AuditError, AuditRecord, AuditSink, AuditStatus, InMemoryAuditSink, RiskLevel};
pub use output::{AuditTrail, FinalOutput};
pub use pipeline::{Pipeline, PipelineError};
pub use reasoning::{ReasoningClient, ReasoningError};
pub use state::{ClinicalInput, ClinicalState, JsonMap, Vitals};
