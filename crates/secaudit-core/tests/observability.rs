//! Observability tests for dashboard workflow tracing.
//!
//! These verify that structured events are emitted for action start,
//! finish, reset and discarded responses.

use std::sync::Arc;
use std::time::Duration;

use secaudit_core::fakes::{RecordingExporter, ScriptedTransport};
use secaudit_core::{
    emit_action_finished, emit_action_started, emit_dashboard_reset, ActionOutcome, BusyAction,
    DashboardController, Endpoint, StandardCatalog,
};
use serde_json::json;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_action_started_logs_action_and_epoch() {
    emit_action_started(BusyAction::Auditing, 3);
    assert!(logs_contain("action.started"));
    assert!(logs_contain("auditing"));
}

#[traced_test]
#[test]
fn test_emit_action_finished_logs_outcome() {
    emit_action_finished(BusyAction::Remediating, 1, ActionOutcome::Completed);
    assert!(logs_contain("action.finished"));
    assert!(logs_contain("completed"));
}

#[traced_test]
#[test]
fn test_emit_dashboard_reset_logs_epoch() {
    emit_dashboard_reset(7);
    assert!(logs_contain("dashboard.reset"));
}

#[tokio::test]
#[traced_test]
async fn test_controller_audit_emits_lifecycle_events() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(Endpoint::Audit, Ok(json!({ "audit_report": {} })));
    let controller = DashboardController::new(
        transport,
        Arc::new(RecordingExporter::new()),
        StandardCatalog::default(),
        Duration::from_secs(5),
    );

    controller.audit().await;

    assert!(logs_contain("action.started"));
    assert!(logs_contain("action.finished"));
}

#[tokio::test]
#[traced_test]
async fn test_action_span_carries_issue_epoch() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(Endpoint::Ingest, Ok(json!({ "chunks": [] })));
    let controller = DashboardController::new(
        transport,
        Arc::new(RecordingExporter::new()),
        StandardCatalog::default(),
        Duration::from_secs(5),
    );
    controller.reset();
    controller.reset();

    controller.ingest().await;

    assert!(logs_contain("secaudit.action{action=ingesting epoch=2}"));
}
