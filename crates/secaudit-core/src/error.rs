//! Error types for secaudit-core

use thiserror::Error;

/// Errors that can occur while driving the audit workflow
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Remote endpoint answered with a non-2xx status
    #[error("{endpoint} request failed with status {status}")]
    Status { endpoint: String, status: u16 },

    /// Request never produced a response (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(String),

    /// Response arrived but lacked an expected field or had the wrong shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Action requested without the state it depends on
    #[error("{0}")]
    Precondition(String),

    /// File export collaborator failed
    #[error("export failed: {0}")]
    Export(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => DashboardError::Status {
                endpoint: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|| "remote".to_string()),
                status: status.as_u16(),
            },
            None => DashboardError::Transport(err.to_string()),
        }
    }
}

impl DashboardError {
    /// Whether this error came from the remote side of an exchange
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            DashboardError::Status { .. }
                | DashboardError::Transport(_)
                | DashboardError::Serialization(_)
        )
    }
}

/// Result type for secaudit-core operations
pub type Result<T> = std::result::Result<T, DashboardError>;
