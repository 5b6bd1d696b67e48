use thiserror::Error;

/// Shown when a failure carries no text from the server.
pub const GENERIC_FAILURE_MESSAGE: &str = "Could not reach the server. Please try again.";

/// Every way a job can end up in the failed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Bad input, transport failure or non-2xx status at submit time.
    #[error("submission failed: {reason}")]
    Submission {
        reason: String,
        server_message: Option<String>,
    },
    /// Network, timeout or parse failure while polling.
    #[error("status poll failed: {reason}")]
    PollTransport {
        reason: String,
        server_message: Option<String>,
    },
    /// The server reported `failed`.
    #[error("job failed: {}", .server_message.as_deref().unwrap_or("no reason given"))]
    JobFailed { server_message: Option<String> },
    /// A single table entry could not be normalized.
    #[error("malformed result entry {index}: {reason}")]
    MalformedResult { index: usize, reason: String },
}

impl JobError {
    pub fn submission(reason: impl Into<String>, server_message: Option<String>) -> Self {
        JobError::Submission {
            reason: reason.into(),
            server_message,
        }
    }

    pub fn poll_transport(reason: impl Into<String>, server_message: Option<String>) -> Self {
        JobError::PollTransport {
            reason: reason.into(),
            server_message,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            JobError::Submission { server_message, .. }
            | JobError::PollTransport { server_message, .. }
            | JobError::JobFailed { server_message } => server_message.as_deref(),
            JobError::MalformedResult { .. } => None,
        }
    }

    /// Text for the user: the server's own words when it sent any.
    pub fn user_message(&self) -> String {
        match self.server_message() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
