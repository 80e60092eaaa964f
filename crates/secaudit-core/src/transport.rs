//! Request/response seam between the workflow and the audit service.
//!
//! [`WorkflowTransport`] is the only way the core talks to the network.
//! [`HttpTransport`] is the production implementation; tests use the
//! in-memory transports in [`crate::fakes`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{DashboardConfig, EndpointConfig};
use crate::error::{DashboardError, Result};

/// The three remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Ingest,
    Audit,
    Remediate,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Endpoint::Ingest => "ingest",
            Endpoint::Audit => "audit",
            Endpoint::Remediate => "remediate",
        };
        write!(f, "{name}")
    }
}

/// One JSON request/response exchange per call.
///
/// Implementations must map a non-2xx status to [`DashboardError::Status`]
/// and anything that prevents a parsed body to another error variant.
#[async_trait]
pub trait WorkflowTransport: Send + Sync {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    endpoints: EndpointConfig,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(HttpTransport {
            endpoints: config.endpoints.clone(),
            http_client,
        })
    }

    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Ingest => &self.endpoints.ingest_url,
            Endpoint::Audit => &self.endpoints.audit_url,
            Endpoint::Remediate => &self.endpoints.remediate_url,
        }
    }
}

#[async_trait]
impl WorkflowTransport for HttpTransport {
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value> {
        let url = self.url(endpoint);
        debug!(endpoint = %endpoint, url = %url, "POST");

        let response = self.http_client.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Remote call failed");
            return Err(DashboardError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_routes_endpoints() {
        let config = DashboardConfig::default()
            .with_endpoints(EndpointConfig::with_base("http://audit.local:5000"));
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(
            transport.url(Endpoint::Remediate),
            "http://audit.local:5000/api/v1/ai-agents/remediate"
        );
        assert_eq!(
            transport.url(Endpoint::Ingest),
            "http://audit.local:5000/api/v1/knowledge/ingest"
        );
    }

    #[test]
    fn test_http_transport_rejects_invalid_config() {
        let mut endpoints = EndpointConfig::with_base("http://audit.local");
        endpoints.audit_url = String::new();
        let config = DashboardConfig::default().with_endpoints(endpoints);
        assert!(HttpTransport::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = DashboardConfig::default()
            .with_endpoints(EndpointConfig::with_base("http://127.0.0.1:9"))
            .with_request_timeout(std::time::Duration::from_secs(2));
        let transport = HttpTransport::new(&config).unwrap();

        // Should fail gracefully, not panic
        let err = transport
            .post_json(Endpoint::Ingest, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.is_remote());
    }
}
