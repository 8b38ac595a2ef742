use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid service endpoint: {0}")]
    Endpoint(String),

    #[error("Request to provisioning service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provisioning service returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Failed to decode provisioning service response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether a poll loop may retry after this error.
    ///
    /// Network faults, partial or malformed responses and server-side 5xx
    /// are retryable; a 4xx is the service definitively rejecting the
    /// request (bad token, unknown task) and must not be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Decode(_) => true,
            Self::Status { status, .. } => status.is_server_error(),
            Self::Endpoint(_) => false,
        }
    }
}
