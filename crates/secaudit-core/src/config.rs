//! Dashboard configuration
//!
//! Defaults point at a locally running audit backend and can be overridden
//! through `SECAUDIT_*` environment variables or the `with_*` builders.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

pub const DEFAULT_INGEST_URL: &str = "http://localhost:5001/api/v1/knowledge/ingest";
pub const DEFAULT_AUDIT_URL: &str = "http://localhost:5000/api/v1/ai-agents/audit";
pub const DEFAULT_REMEDIATE_URL: &str = "http://localhost:5000/api/v1/ai-agents/remediate";

/// How long a status message stays visible.
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Audits fan out to an LLM per service, so the default is generous.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Remote endpoints for the three workflow stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub ingest_url: String,
    pub audit_url: String,
    pub remediate_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            ingest_url: env_or("SECAUDIT_INGEST_URL", DEFAULT_INGEST_URL),
            audit_url: env_or("SECAUDIT_AUDIT_URL", DEFAULT_AUDIT_URL),
            remediate_url: env_or("SECAUDIT_REMEDIATE_URL", DEFAULT_REMEDIATE_URL),
        }
    }
}

impl EndpointConfig {
    /// Endpoints under a single base URL, using the backend's route layout
    pub fn with_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        EndpointConfig {
            ingest_url: format!("{base}/api/v1/knowledge/ingest"),
            audit_url: format!("{base}/api/v1/ai-agents/audit"),
            remediate_url: format!("{base}/api/v1/ai-agents/remediate"),
        }
    }
}

/// Top-level configuration for a dashboard controller
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub endpoints: EndpointConfig,
    pub message_ttl: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            endpoints: EndpointConfig::default(),
            message_ttl: env_secs("SECAUDIT_MESSAGE_TTL_SECS").unwrap_or(DEFAULT_MESSAGE_TTL),
            request_timeout: env_secs("SECAUDIT_REQUEST_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            user_agent: format!("secaudit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl DashboardConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_message_ttl(mut self, ttl: Duration) -> Self {
        self.message_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("ingest_url", &self.endpoints.ingest_url),
            ("audit_url", &self.endpoints.audit_url),
            ("remediate_url", &self.endpoints.remediate_url),
        ] {
            if url.trim().is_empty() {
                return Err(DashboardError::Config(format!("{name} must not be empty")));
            }
        }
        if self.message_ttl.is_zero() {
            return Err(DashboardError::Config(
                "message_ttl must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
