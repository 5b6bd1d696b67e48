use crate::{FoundItem, JobError, JobId, JobKind, NormalizedResult, ProgressSnapshot, Ticket};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Submit {
        ticket: Ticket,
        kind: JobKind,
    },
    /// The single Submitting -> Polling transition of a lifecycle.
    Started {
        ticket: Ticket,
        job_id: JobId,
        kind: JobKind,
    },
    /// Issue the next status request after the kind's poll interval.
    SchedulePoll {
        job_id: JobId,
        kind: JobKind,
    },
    EmitProgress(ProgressSnapshot),
    EmitFoundItems {
        job_id: JobId,
        items: Vec<FoundItem>,
    },
    DeliverResult {
        job_id: JobId,
        result: NormalizedResult,
    },
    EmitFailure {
        ticket: Ticket,
        job_id: Option<JobId>,
        error: JobError,
    },
    /// Return to idle after the failure reset delay.
    ScheduleDismiss {
        ticket: Ticket,
    },
    /// Tracker went back to idle after an acknowledged terminal state.
    Reset,
}
