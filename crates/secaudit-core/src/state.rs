//! Workflow state owned by the dashboard controller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages::StatusMessage;
use crate::model::{IngestBatch, RemediationItem};
use crate::normalize::FlatReport;
use crate::standards::SelectionSet;

/// The action currently holding the busy flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyAction {
    Ingesting,
    Auditing,
    Remediating,
}

impl std::fmt::Display for BusyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BusyAction::Ingesting => "ingesting",
            BusyAction::Auditing => "auditing",
            BusyAction::Remediating => "remediating",
        };
        write!(f, "{name}")
    }
}

/// What happened to one triggered action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "busy")]
pub enum ActionOutcome {
    /// Response applied to the workflow state
    Completed,
    /// Failure recorded as a message or error
    Failed,
    /// Not started because another action holds the busy flag
    Rejected(BusyAction),
    /// Response arrived after a reset and was dropped
    Discarded,
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionOutcome::Completed => write!(f, "completed"),
            ActionOutcome::Failed => write!(f, "failed"),
            ActionOutcome::Rejected(busy) => write!(f, "rejected ({busy})"),
            ActionOutcome::Discarded => write!(f, "discarded"),
        }
    }
}

/// Mutable workflow state. Only the controller touches it, under one lock.
#[derive(Debug)]
pub(crate) struct WorkflowState {
    /// Bumped on reset; responses issued under an older epoch are dropped
    pub epoch: u64,
    pub selection: SelectionSet,
    pub raw_audit: Option<Value>,
    pub report: Option<FlatReport>,
    pub ingestion: Vec<IngestBatch>,
    pub remediation: Vec<RemediationItem>,
    pub busy: Option<BusyAction>,
}

impl WorkflowState {
    pub fn new(selection: SelectionSet) -> Self {
        Self {
            epoch: 0,
            selection,
            raw_audit: None,
            report: None,
            ingestion: Vec::new(),
            remediation: Vec::new(),
            busy: None,
        }
    }

    /// Return to the load-time state and invalidate in-flight responses.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.selection.clear();
        self.raw_audit = None;
        self.report = None;
        self.ingestion.clear();
        self.remediation.clear();
        self.busy = None;
    }
}

/// Owned snapshot of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub epoch: u64,
    pub selected_standards: Vec<String>,
    pub report: Option<FlatReport>,
    pub ingestion: Vec<IngestBatch>,
    pub remediation: Vec<RemediationItem>,
    pub message: Option<StatusMessage>,
    pub error: Option<String>,
    pub busy: Option<BusyAction>,
    pub has_audit_payload: bool,
}

impl DashboardView {
    /// Ingested chunks across every batch, in arrival order.
    pub fn chunks(&self) -> impl Iterator<Item = &crate::model::IngestChunk> {
        self.ingestion.iter().flat_map(|b| b.chunks.iter())
    }
}
