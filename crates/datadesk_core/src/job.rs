use std::fmt;

use serde::{Deserialize, Serialize};

/// Client-local sequence number for one start-to-terminal lifecycle.
pub type Ticket = u64;

/// Opaque job identifier assigned by the server at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Research,
    PdfProcessing,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Research => write!(f, "research"),
            JobKind::PdfProcessing => write!(f, "pdf_processing"),
        }
    }
}

/// Server-reported job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps the backend's status vocabulary onto the four canonical states.
    ///
    /// The backend also reports intermediate steps (`starting`, `searching`,
    /// `processing`); anything that is not terminal counts as in progress.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "starting" | "pending" => JobStatus::Queued,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::InProgress,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Tracker lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl Phase {
    /// Submitting or polling: a new job may not start.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Polling)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }
}

/// A source document discovered by a research job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundItem {
    pub title: Option<String>,
    pub url: String,
}

/// Incremental progress delivered after every successful poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub job_id: JobId,
    pub progress: u8,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::JobStatus;

    #[test]
    fn backend_steps_are_not_terminal() {
        assert_eq!(JobStatus::from_wire("starting"), JobStatus::Queued);
        assert_eq!(JobStatus::from_wire("searching"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_wire("processing"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_wire("something_new"), JobStatus::InProgress);
    }

    #[test]
    fn terminal_statuses_are_case_insensitive() {
        assert_eq!(JobStatus::from_wire("Completed"), JobStatus::Completed);
        assert_eq!(JobStatus::from_wire(" FAILED "), JobStatus::Failed);
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }
}
