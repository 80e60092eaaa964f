//! secaudit Core Library
//!
//! Workflow orchestration and report normalization for the compliance audit
//! dashboard. The operator picks standards, then drives a remote workflow:
//! ingest reference policies, run an audit, optionally request remediation.
//!
//! ## Key Components
//!
//! - `SelectionSet`: chosen standards with the "all standards" sentinel kept consistent
//! - `WorkflowRequestClient`: the three remote exchanges over a `WorkflowTransport`
//! - `normalize`: raw audit mapping to a non-compliant-first `FlatReport`
//! - `TransientMessageBus`: self-expiring status message plus an error slot
//! - `DashboardController`: owns the workflow state and all its transitions
//!
//! Rendering and file export are collaborators supplied by the embedder.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod fakes;
pub mod messages;
pub mod model;
pub mod normalize;
pub mod obs;
pub mod standards;
pub mod state;
pub mod telemetry;
pub mod transport;

pub use client::WorkflowRequestClient;
pub use config::{DashboardConfig, EndpointConfig};
pub use controller::DashboardController;
pub use error::{DashboardError, Result};
pub use export::{FileExporter, ReportExporter, AUDIT_REPORT_FILENAME};
pub use messages::{MessageLevel, StatusMessage, TransientMessageBus};
pub use model::{IngestBatch, IngestChunk, PluginRef, RemediationItem};
pub use normalize::{normalize, FlatReport, MissingPlugin, PolicyCheckRecord, ServiceFailure};
pub use obs::{
    emit_action_finished, emit_action_rejected, emit_action_started, emit_dashboard_reset,
    emit_message_expired, emit_response_discarded, record_action_epoch,
};
pub use standards::{SelectionSet, StandardCatalog, ALL_STANDARDS, DEFAULT_STANDARDS};
pub use state::{ActionOutcome, BusyAction, DashboardView};
pub use telemetry::init_tracing;
pub use transport::{Endpoint, HttpTransport, WorkflowTransport};
