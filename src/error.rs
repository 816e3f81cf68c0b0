//! Client and workflow error types

use thiserror::Error;

/// Errors raised while talking to the grievance API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, TLS, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-2xx status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether an idempotent read may be retried after this error.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ClientError::Server { status, .. } => *status >= 500,
            ClientError::Timeout => true,
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by board workflows.
///
/// The first group are rejections decided locally before any request is
/// sent; `Fetch` and `Mutation` wrap a failed round trip.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Complaint {0} not found")]
    UnknownComplaint(String),

    #[error("Complaint {0} is already assigned")]
    AlreadyAssigned(String),

    #[error("Complaint {0} has no assigned officer")]
    NotAssigned(String),

    #[error("Complaint {0} already has a request in flight")]
    Busy(String),

    #[error("Complaint {0} is not the selected complaint")]
    NotSelected(String),

    #[error("Update text cannot be empty")]
    EmptyUpdate,

    #[error("Nothing to commit for complaint {0}")]
    EmptyDraft(String),

    #[error("Failed to load complaints: {0}")]
    Fetch(#[source] ClientError),

    #[error("Request failed: {0}")]
    Mutation(#[source] ClientError),
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
