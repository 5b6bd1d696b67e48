use crate::view_model::{results_view, TrackerView};
use crate::{FoundItem, JobError, JobId, JobKind, JobStatus, NormalizedResult, Phase, Ticket};

/// The single "current job" slot of a tracker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerState {
    pub(crate) phase: Phase,
    pub(crate) last_ticket: Ticket,
    pub(crate) job: Option<TrackedJob>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrackedJob {
    pub(crate) ticket: Ticket,
    pub(crate) kind: JobKind,
    pub(crate) id: Option<JobId>,
    pub(crate) status: JobStatus,
    /// High-water mark of reported progress.
    pub(crate) progress: u8,
    pub(crate) message: String,
    pub(crate) found_items: Vec<FoundItem>,
    pub(crate) error: Option<JobError>,
    pub(crate) result: Option<NormalizedResult>,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn current_ticket(&self) -> Option<Ticket> {
        self.job.as_ref().map(|job| job.ticket)
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job.as_ref().and_then(|job| job.id.as_ref())
    }

    pub fn view(&self) -> TrackerView {
        let Some(job) = &self.job else {
            return TrackerView {
                phase: self.phase,
                ..TrackerView::default()
            };
        };
        TrackerView {
            phase: self.phase,
            ticket: Some(job.ticket),
            kind: Some(job.kind),
            job_id: job.id.clone(),
            status: Some(job.status),
            progress: job.progress,
            message: job.message.clone(),
            found_items: job.found_items.clone(),
            error_message: job.error.as_ref().map(JobError::user_message),
            results: job.result.as_ref().map(results_view),
        }
    }

    pub(crate) fn begin(&mut self, kind: JobKind) -> Ticket {
        self.last_ticket += 1;
        self.phase = Phase::Submitting;
        self.job = Some(TrackedJob {
            ticket: self.last_ticket,
            kind,
            id: None,
            status: JobStatus::Queued,
            progress: 0,
            message: String::new(),
            found_items: Vec::new(),
            error: None,
            result: None,
        });
        self.last_ticket
    }

    /// Job of this lifecycle, if it is still current and in `phase`.
    pub(crate) fn job_in(&mut self, ticket: Ticket, phase: Phase) -> Option<&mut TrackedJob> {
        if self.phase != phase {
            return None;
        }
        self.job.as_mut().filter(|job| job.ticket == ticket)
    }

    /// Job being polled under this id, if any.
    pub(crate) fn polling_job(&mut self, job_id: &JobId) -> Option<&mut TrackedJob> {
        if self.phase != Phase::Polling {
            return None;
        }
        self.job
            .as_mut()
            .filter(|job| job.id.as_ref() == Some(job_id))
    }

    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.job = None;
    }
}
