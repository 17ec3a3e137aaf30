use reqwest::StatusCode;
use thiserror::Error;

/// Failure while executing one request against the Straico API.
///
/// Network failures carry no status; non-2xx responses carry the status
/// and, when readable, the response body.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<StatusCode>,
    pub message: String,
    pub body: Option<String>,
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            body: None,
        }
    }

    pub fn api(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            format!("Straico API error {status}")
        } else {
            format!("Straico API error {status}: {body}")
        };
        Self {
            status: Some(status),
            message,
            body: Some(body),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

/// Every way processing one input item can fail.
#[derive(Debug, Error)]
pub enum StraicoError {
    #[error("The operation '{operation}' is not supported for resource '{resource}'")]
    Configuration { resource: String, operation: String },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Builder(String),
}

impl StraicoError {
    pub fn configuration(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Configuration {
            resource: resource.into(),
            operation: operation.into(),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Auth(_) => "auth",
            Self::Transport(_) => "transport",
            Self::Builder(_) => "builder",
        }
    }
}
