//! Transient message lifecycle under a paused clock.

use std::sync::Arc;
use std::time::Duration;

use secaudit_core::fakes::{RecordingExporter, ScriptedTransport};
use secaudit_core::{
    DashboardController, Endpoint, MessageLevel, StandardCatalog, TransientMessageBus,
};
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn test_newer_message_survives_older_expiry() {
    let bus = TransientMessageBus::new(Duration::from_secs(5));

    bus.set_message("first", MessageLevel::Info);
    tokio::time::sleep(Duration::from_secs(2)).await;
    bus.set_message("second", MessageLevel::Success);

    // Past the first message's original expiry (t=5s)
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(bus.message().unwrap().text, "second");

    // Past the second message's expiry (t=7s)
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(bus.message().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_controller_message_expires_but_report_stays() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond(
        Endpoint::Audit,
        Ok(json!({ "audit_report": { "svc": { "policies": [{ "comply": true }] } } })),
    );
    let controller = DashboardController::new(
        transport,
        Arc::new(RecordingExporter::new()),
        StandardCatalog::default(),
        Duration::from_secs(5),
    );

    controller.audit().await;
    assert!(controller.view().message.is_some());

    tokio::time::sleep(Duration::from_secs(6)).await;
    let view = controller.view();
    assert!(view.message.is_none());
    assert!(view.report.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_expiry() {
    let bus = TransientMessageBus::new(Duration::from_secs(5));
    bus.set_message("before reset", MessageLevel::Info);
    tokio::time::sleep(Duration::from_secs(1)).await;

    bus.clear();
    bus.set_message("after reset", MessageLevel::Info);
    tokio::time::sleep(Duration::from_millis(4500)).await;

    assert_eq!(bus.message().unwrap().text, "after reset");
}
