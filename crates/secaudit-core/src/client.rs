//! Workflow request client
//!
//! Builds the request bodies for ingest, audit and remediate and turns the
//! responses into typed values. Busy tracking and state updates belong to
//! the controller; this client only performs the exchanges.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{DashboardError, Result};
use crate::model::{IngestBatch, RemediationItem};
use crate::transport::{Endpoint, WorkflowTransport};

/// Client for the three remote workflow stages
#[derive(Clone)]
pub struct WorkflowRequestClient {
    transport: Arc<dyn WorkflowTransport>,
}

impl WorkflowRequestClient {
    pub fn new(transport: Arc<dyn WorkflowTransport>) -> Self {
        Self { transport }
    }

    /// Ask the knowledge service to ingest its reference policies.
    pub async fn ingest(&self) -> Result<IngestBatch> {
        let body = self.transport.post_json(Endpoint::Ingest, json!({})).await?;
        let batch = IngestBatch::from_response(body);
        info!(
            chunks = batch.chunks.len(),
            index = batch.index_name.as_deref().unwrap_or("-"),
            "Ingestion batch received"
        );
        Ok(batch)
    }

    /// Run an audit against the selected standards.
    ///
    /// Returns the raw `audit_report` mapping, or
    /// [`DashboardError::MalformedResponse`] when the body has none.
    pub async fn audit(&self, selected_standards: &[String]) -> Result<Value> {
        let body = json!({ "selected_standards": selected_standards });
        let mut response = self.transport.post_json(Endpoint::Audit, body).await?;

        match response.get_mut("audit_report").map(Value::take) {
            Some(report) if !report.is_null() => {
                debug!(
                    services = report.as_object().map_or(0, |m| m.len()),
                    "Audit report received"
                );
                Ok(report)
            }
            _ => Err(DashboardError::MalformedResponse(
                "audit response has no audit_report field".to_string(),
            )),
        }
    }

    /// Request a remediation plan for a previously returned audit report.
    pub async fn remediate(&self, audit_report: &Value) -> Result<Vec<RemediationItem>> {
        let body = json!({ "audit_report": audit_report });
        let response = self.transport.post_json(Endpoint::Remediate, body).await?;

        let Value::Array(entries) = response else {
            return Err(DashboardError::MalformedResponse(
                "remediation response is not a list".to_string(),
            ));
        };
        let items: Vec<RemediationItem> =
            entries.into_iter().map(RemediationItem::from_value).collect();
        info!(items = items.len(), "Remediation plan received");
        Ok(items)
    }
}
