use bytes::Bytes;
use datadesk_core::{
    FoundItem, JobError, JobId, JobKind, NormalizedResult, ProgressSnapshot,
};

/// Work to submit, with everything the submit endpoint needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    Research { topic: String, max_pdfs: u32 },
    PdfUpload { file_name: String, bytes: Bytes },
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::Research { .. } => JobKind::Research,
            JobRequest::PdfUpload { .. } => JobKind::PdfProcessing,
        }
    }

    /// Local checks run before anything is sent. Range limits on
    /// `max_pdfs` are left to the server.
    pub fn validate(&self) -> Result<(), ClientError> {
        match self {
            JobRequest::Research { topic, max_pdfs } => {
                if topic.trim().is_empty() {
                    return Err(ClientError::InvalidInput(
                        "Please enter a research topic".to_string(),
                    ));
                }
                if *max_pdfs == 0 {
                    return Err(ClientError::InvalidInput(
                        "Number of PDFs must be at least 1".to_string(),
                    ));
                }
            }
            JobRequest::PdfUpload { file_name, bytes } => {
                if !file_name.to_ascii_lowercase().ends_with(".pdf") {
                    return Err(ClientError::InvalidInput("File must be a PDF".to_string()));
                }
                if bytes.is_empty() {
                    return Err(ClientError::InvalidInput("PDF file is empty".to_string()));
                }
            }
        }
        Ok(())
    }
}

/// Everything a tracker reports to its sink.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Started { job_id: JobId, kind: JobKind },
    Progress(ProgressSnapshot),
    /// The found-items list changed. An empty list, or one equal to the last
    /// delivered list, is not re-sent; the latest list is also in
    /// `TrackerView::found_items`.
    FoundItems { job_id: JobId, items: Vec<FoundItem> },
    Completed { job_id: JobId, result: NormalizedResult },
    Failed { job_id: Option<JobId>, error: JobError },
    /// Back to idle after a terminal state was acknowledged.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(NormalizedResult),
    Failed(JobError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("http status {status}")]
    HttpStatus { status: u16, detail: Option<String> },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ClientError {
    /// Text meant for the user, if this error carries any.
    fn user_text(&self) -> Option<String> {
        match self {
            ClientError::InvalidInput(message) => Some(message.clone()),
            ClientError::HttpStatus { detail, .. } => detail.clone(),
            ClientError::Timeout | ClientError::Network(_) | ClientError::Malformed(_) => None,
        }
    }

    pub fn into_submission_error(self) -> JobError {
        let user_text = self.user_text();
        JobError::submission(self.to_string(), user_text)
    }

    pub fn into_poll_error(self) -> JobError {
        let user_text = self.user_text();
        JobError::poll_transport(self.to_string(), user_text)
    }
}
