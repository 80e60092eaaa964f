//! Dashboard controller
//!
//! Owns the workflow state and is the only place it changes. Each action
//! follows `Idle -> Busy(action) -> Idle`:
//!
//! - one busy flag is shared by ingest, audit and remediate, so a second
//!   action triggered while one is in flight is rejected, not queued;
//! - the flag is released by a [`BusyGuard`] on every exit path;
//! - the epoch is captured when a request is issued and re-checked when its
//!   response arrives, so anything issued before a [`reset`] cannot touch
//!   the state afterwards.
//!
//! Lock order is always workflow state, then message bus.
//!
//! [`reset`]: DashboardController::reset

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{info, warn, Instrument};

use crate::client::WorkflowRequestClient;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::export::{ReportExporter, AUDIT_REPORT_FILENAME};
use crate::messages::{MessageLevel, TransientMessageBus};
use crate::normalize::{normalize, FlatReport};
use crate::obs;
use crate::standards::{SelectionSet, StandardCatalog};
use crate::state::{ActionOutcome, BusyAction, DashboardView, WorkflowState};
use crate::transport::{HttpTransport, WorkflowTransport};

pub const MSG_INGEST_OK: &str = "Knowledge base ingested successfully!";
pub const MSG_AUDIT_OK: &str = "Audit completed successfully!";
pub const MSG_AUDIT_NO_REPORT: &str = "Audit completed but the response contained no audit report.";
pub const MSG_REMEDIATE_OK: &str = "Remediation plan generated successfully!";
pub const ERR_NO_AUDIT_FOR_REMEDIATION: &str = "Run an audit before requesting remediation.";
pub const ERR_NO_AUDIT_FOR_DOWNLOAD: &str = "No audit report available to download.";

/// Releases the busy flag when the action that took it ends, however it ends.
struct BusyGuard<'a> {
    state: &'a Mutex<WorkflowState>,
    action: BusyAction,
    epoch: u64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        if state.epoch == self.epoch && state.busy == Some(self.action) {
            state.busy = None;
        }
    }
}

/// Composes selection, remote client, normalizer and message bus.
pub struct DashboardController {
    client: WorkflowRequestClient,
    exporter: Arc<dyn ReportExporter>,
    state: Mutex<WorkflowState>,
    messages: TransientMessageBus,
}

impl DashboardController {
    pub fn new(
        transport: Arc<dyn WorkflowTransport>,
        exporter: Arc<dyn ReportExporter>,
        catalog: StandardCatalog,
        message_ttl: Duration,
    ) -> Self {
        let selection = SelectionSet::new(Arc::new(catalog));
        Self {
            client: WorkflowRequestClient::new(transport),
            exporter,
            state: Mutex::new(WorkflowState::new(selection)),
            messages: TransientMessageBus::new(message_ttl),
        }
    }

    /// Controller talking HTTP to the endpoints in `config`.
    pub fn with_http(
        config: &DashboardConfig,
        catalog: StandardCatalog,
        exporter: Arc<dyn ReportExporter>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            exporter,
            catalog,
            config.message_ttl,
        ))
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Toggle a standard; returns `false` for identifiers outside the catalog.
    pub fn toggle_standard(&self, standard: &str) -> bool {
        self.lock_state().selection.toggle(standard)
    }

    pub fn is_selected(&self, standard: &str) -> bool {
        self.lock_state().selection.is_selected(standard)
    }

    pub fn selected_standards(&self) -> Vec<String> {
        self.lock_state().selection.selected()
    }

    pub fn catalog(&self) -> StandardCatalog {
        self.lock_state().selection.catalog().clone()
    }

    // -----------------------------------------------------------------------
    // Remote actions
    // -----------------------------------------------------------------------

    /// Ingest reference policies and append the returned batch.
    pub async fn ingest(&self) -> ActionOutcome {
        self.run_ingest()
            .instrument(obs::action_span(BusyAction::Ingesting))
            .await
    }

    /// Audit against the selected standards and store the normalized report.
    pub async fn audit(&self) -> ActionOutcome {
        self.run_audit()
            .instrument(obs::action_span(BusyAction::Auditing))
            .await
    }

    /// Request a remediation plan for the stored audit report.
    pub async fn remediate(&self) -> ActionOutcome {
        self.run_remediate()
            .instrument(obs::action_span(BusyAction::Remediating))
            .await
    }

    async fn run_ingest(&self) -> ActionOutcome {
        let action = BusyAction::Ingesting;
        let guard = match self.begin(action) {
            Ok(guard) => guard,
            Err(busy) => return ActionOutcome::Rejected(busy),
        };

        let result = self.client.ingest().await;
        let outcome = self.complete(action, guard.epoch, |state, messages| match result {
            Ok(batch) => {
                state.ingestion.push(batch);
                messages.set_message(MSG_INGEST_OK, MessageLevel::Success);
                ActionOutcome::Completed
            }
            Err(err) => {
                warn!(error = %err, "Ingestion failed");
                messages.set_message(
                    failure_text("ingest knowledge base", &err),
                    MessageLevel::Failure,
                );
                ActionOutcome::Failed
            }
        });
        obs::emit_action_finished(action, guard.epoch, outcome);
        outcome
    }

    async fn run_audit(&self) -> ActionOutcome {
        let action = BusyAction::Auditing;
        let guard = match self.begin(action) {
            Ok(guard) => guard,
            Err(busy) => return ActionOutcome::Rejected(busy),
        };

        let selected = {
            let mut state = self.lock_state();
            state.raw_audit = None;
            state.report = None;
            state.ingestion.clear();
            state.selection.selected()
        };

        let result = self.client.audit(&selected).await;
        let outcome = self.complete(action, guard.epoch, |state, messages| match result {
            Ok(raw) => {
                let report = normalize(&raw);
                info!(
                    records = report.len(),
                    non_compliant = report.non_compliant_count(),
                    "Audit report normalized"
                );
                state.raw_audit = Some(raw);
                state.report = Some(report);
                messages.set_message(MSG_AUDIT_OK, MessageLevel::Success);
                ActionOutcome::Completed
            }
            Err(DashboardError::MalformedResponse(reason)) => {
                warn!(reason = %reason, "Audit response unusable");
                messages.set_message(MSG_AUDIT_NO_REPORT, MessageLevel::Warning);
                ActionOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "Audit failed");
                messages.set_message(failure_text("run audit", &err), MessageLevel::Failure);
                ActionOutcome::Failed
            }
        });
        obs::emit_action_finished(action, guard.epoch, outcome);
        outcome
    }

    async fn run_remediate(&self) -> ActionOutcome {
        let action = BusyAction::Remediating;
        let guard = match self.begin(action) {
            Ok(guard) => guard,
            Err(busy) => return ActionOutcome::Rejected(busy),
        };

        let payload = {
            let state = self.lock_state();
            self.messages.clear_error();
            stored_audit(&state, ERR_NO_AUDIT_FOR_REMEDIATION)
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                self.messages.set_error(err.to_string());
                obs::emit_action_finished(action, guard.epoch, ActionOutcome::Failed);
                return ActionOutcome::Failed;
            }
        };

        let result = self.client.remediate(&payload).await;
        let outcome = self.complete(action, guard.epoch, |state, messages| match result {
            Ok(items) => {
                state.remediation = items;
                messages.set_message(MSG_REMEDIATE_OK, MessageLevel::Success);
                ActionOutcome::Completed
            }
            Err(DashboardError::Status { status, .. }) => {
                warn!(status, "Remediation rejected by service");
                messages.set_error(format!("Remediation failed with status {status}."));
                ActionOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "Remediation failed");
                messages.set_error(format!("Remediation failed: {err}"));
                ActionOutcome::Failed
            }
        });
        obs::emit_action_finished(action, guard.epoch, outcome);
        outcome
    }

    /// Take the busy flag for `action` under the current epoch.
    fn begin(&self, action: BusyAction) -> std::result::Result<BusyGuard<'_>, BusyAction> {
        let mut state = self.lock_state();
        if let Some(busy) = state.busy {
            obs::emit_action_rejected(action, busy);
            return Err(busy);
        }
        state.busy = Some(action);
        obs::record_action_epoch(state.epoch);
        obs::emit_action_started(action, state.epoch);
        Ok(BusyGuard {
            state: &self.state,
            action,
            epoch: state.epoch,
        })
    }

    /// Apply a response, unless a reset happened since it was issued.
    fn complete<F>(&self, action: BusyAction, epoch: u64, apply: F) -> ActionOutcome
    where
        F: FnOnce(&mut WorkflowState, &TransientMessageBus) -> ActionOutcome,
    {
        let mut state = self.lock_state();
        if state.epoch != epoch {
            obs::emit_response_discarded(action, epoch, state.epoch);
            return ActionOutcome::Discarded;
        }
        apply(&mut *state, &self.messages)
    }

    // -----------------------------------------------------------------------
    // Local actions
    // -----------------------------------------------------------------------

    /// Return everything to the load-time state.
    ///
    /// In-flight requests keep running, but their responses are discarded.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.reset();
        self.messages.clear();
        obs::emit_dashboard_reset(state.epoch);
    }

    /// Hand the stored raw audit report to the exporter.
    pub fn request_download(&self) -> ActionOutcome {
        let payload = stored_audit(&self.lock_state(), ERR_NO_AUDIT_FOR_DOWNLOAD);
        let exported = payload
            .and_then(|raw| Ok(serde_json::to_string_pretty(&raw)?))
            .and_then(|payload| self.exporter.export(AUDIT_REPORT_FILENAME, &payload));
        match exported {
            Ok(()) => ActionOutcome::Completed,
            Err(err @ DashboardError::Precondition(_)) => {
                self.messages.set_error(err.to_string());
                ActionOutcome::Failed
            }
            Err(err) => {
                warn!(error = %err, "Download failed");
                self.messages.set_error(format!("Download failed: {err}"));
                ActionOutcome::Failed
            }
        }
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    pub fn view(&self) -> DashboardView {
        let state = self.lock_state();
        DashboardView {
            epoch: state.epoch,
            selected_standards: state.selection.selected(),
            report: state.report.clone(),
            ingestion: state.ingestion.clone(),
            remediation: state.remediation.clone(),
            message: self.messages.message(),
            error: self.messages.error(),
            busy: state.busy,
            has_audit_payload: state.raw_audit.is_some(),
        }
    }

    pub fn report(&self) -> Option<FlatReport> {
        self.lock_state().report.clone()
    }

    pub fn busy(&self) -> Option<BusyAction> {
        self.lock_state().busy
    }

    pub fn epoch(&self) -> u64 {
        self.lock_state().epoch
    }

    pub fn messages(&self) -> &TransientMessageBus {
        &self.messages
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkflowState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<WorkflowState>) -> MutexGuard<'_, WorkflowState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Raw audit payload, or a precondition error carrying `missing`.
fn stored_audit(state: &WorkflowState, missing: &str) -> Result<serde_json::Value> {
    state
        .raw_audit
        .clone()
        .ok_or_else(|| DashboardError::Precondition(missing.to_string()))
}

fn failure_text(what: &str, err: &DashboardError) -> String {
    match err {
        DashboardError::Status { status, .. } => format!("Failed to {what} (status {status})."),
        _ => format!("Failed to {what}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{RecordingExporter, ScriptedTransport};
    use crate::transport::Endpoint;
    use serde_json::json;

    fn controller() -> (Arc<ScriptedTransport>, DashboardController) {
        let transport = Arc::new(ScriptedTransport::new());
        let controller = DashboardController::new(
            transport.clone(),
            Arc::new(RecordingExporter::new()),
            StandardCatalog::default(),
            Duration::from_secs(5),
        );
        (transport, controller)
    }

    #[tokio::test]
    async fn test_busy_flag_released_after_failure() {
        let (transport, controller) = controller();
        transport.fail_transport(Endpoint::Ingest, "connection refused");

        assert_eq!(controller.ingest().await, ActionOutcome::Failed);
        assert!(controller.busy().is_none());
        let message = controller.messages().message().unwrap();
        assert_eq!(message.level, MessageLevel::Failure);
        assert!(message.text.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_ingest_failure_keeps_prior_batches() {
        let (transport, controller) = controller();
        transport.respond(Endpoint::Ingest, Ok(json!({ "chunks": [{ "chunk_id": "c1" }] })));
        transport.fail_status(Endpoint::Ingest, 503);

        controller.ingest().await;
        assert_eq!(controller.ingest().await, ActionOutcome::Failed);

        let view = controller.view();
        assert_eq!(view.ingestion.len(), 1);
        assert_eq!(view.message.unwrap().text, "Failed to ingest knowledge base (status 503).");
    }

    #[tokio::test]
    async fn test_guard_clears_only_its_own_epoch() {
        let (_transport, controller) = controller();
        let guard = controller.begin(BusyAction::Auditing).unwrap();
        controller.reset();
        let next = controller.begin(BusyAction::Ingesting).unwrap();

        drop(guard);
        assert_eq!(controller.busy(), Some(BusyAction::Ingesting));
        drop(next);
        assert!(controller.busy().is_none());
    }

    #[test]
    fn test_stored_audit_missing_is_precondition() {
        let state = WorkflowState::new(SelectionSet::new(Arc::new(StandardCatalog::default())));
        let err = stored_audit(&state, ERR_NO_AUDIT_FOR_DOWNLOAD).unwrap_err();
        assert!(matches!(err, DashboardError::Precondition(_)));
        assert_eq!(err.to_string(), ERR_NO_AUDIT_FOR_DOWNLOAD);
    }

    #[test]
    fn test_failure_text() {
        let status = DashboardError::Status {
            endpoint: "audit".to_string(),
            status: 404,
        };
        assert_eq!(failure_text("run audit", &status), "Failed to run audit (status 404).");
    }
}
