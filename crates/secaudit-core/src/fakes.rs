//! In-memory fakes for the transport and exporter seams (testing only)
//!
//! Provides `ScriptedTransport` and `RecordingExporter`, which satisfy the
//! trait contracts without a network or filesystem.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::{DashboardError, Result};
use crate::export::ReportExporter;
use crate::transport::{Endpoint, WorkflowTransport};

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Holds one response in flight until the test releases it.
#[derive(Debug, Default)]
pub struct ResponseGate {
    arrived: Notify,
    release: Notify,
}

impl ResponseGate {
    /// Wait until the request reached the transport.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    /// Let the held response complete.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

/// Transport that replays queued responses per endpoint and records requests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<Endpoint, VecDeque<Result<Value>>>>,
    gates: Mutex<HashMap<Endpoint, Arc<ResponseGate>>>,
    requests: Mutex<Vec<(Endpoint, Value)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call to `endpoint`.
    pub fn respond(&self, endpoint: Endpoint, response: Result<Value>) {
        self.responses
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(response);
    }

    pub fn fail_status(&self, endpoint: Endpoint, status: u16) {
        self.respond(
            endpoint,
            Err(DashboardError::Status {
                endpoint: endpoint.to_string(),
                status,
            }),
        );
    }

    pub fn fail_transport(&self, endpoint: Endpoint, reason: &str) {
        self.respond(endpoint, Err(DashboardError::Transport(reason.to_string())));
    }

    /// Hold the next call to `endpoint` until the returned gate is released.
    pub fn hold(&self, endpoint: Endpoint) -> Arc<ResponseGate> {
        let gate = Arc::new(ResponseGate::default());
        self.gates.lock().unwrap().insert(endpoint, gate.clone());
        gate
    }

    /// Requests seen so far, in call order.
    pub fn requests(&self) -> Vec<(Endpoint, Value)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, endpoint: Endpoint) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }
}

#[async_trait]
impl WorkflowTransport for ScriptedTransport {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value> {
        self.requests.lock().unwrap().push((endpoint, body));

        let gate = self.gates.lock().unwrap().remove(&endpoint);
        if let Some(gate) = gate {
            gate.arrived.notify_one();
            gate.release.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(DashboardError::Transport(format!(
                    "no scripted response for {endpoint}"
                )))
            })
    }
}

// ---------------------------------------------------------------------------
// RecordingExporter
// ---------------------------------------------------------------------------

/// Exporter that records every `(filename, payload)` it is handed.
#[derive(Debug, Default)]
pub struct RecordingExporter {
    exports: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exporter whose every export fails.
    pub fn failing() -> Self {
        Self {
            exports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn exports(&self) -> Vec<(String, String)> {
        self.exports.lock().unwrap().clone()
    }
}

impl ReportExporter for RecordingExporter {
    fn export(&self, filename: &str, payload: &str) -> Result<()> {
        if self.fail {
            return Err(DashboardError::Export("disk full".to_string()));
        }
        self.exports
            .lock()
            .unwrap()
            .push((filename.to_string(), payload.to_string()));
        Ok(())
    }
}
