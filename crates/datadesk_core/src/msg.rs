use serde_json::Value;

use crate::{JobError, JobId, JobKind, Ticket};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked to start a job of this kind.
    StartRequested { kind: JobKind },
    /// Submit endpoint answered with a job id.
    SubmitSucceeded { ticket: Ticket, job_id: JobId },
    /// Submission was rejected or never reached the server.
    SubmitFailed { ticket: Ticket, error: JobError },
    /// Raw body of one status response.
    StatusReceived { job_id: JobId, payload: Value },
    /// A status request failed before producing a body.
    PollFailed { job_id: JobId, error: JobError },
    /// Stop tracking the active job locally. `None` cancels whichever
    /// lifecycle is active.
    CancelRequested { ticket: Option<Ticket> },
    /// Caller acknowledged a terminal state. `None` acknowledges whichever
    /// lifecycle is current.
    Dismissed { ticket: Option<Ticket> },
}
