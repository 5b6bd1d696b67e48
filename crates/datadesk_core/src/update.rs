use datadesk_logging::{desk_debug, desk_info, desk_warn};
use serde_json::Value;

use crate::render::normalize;
use crate::status::StatusReport;
use crate::{Effect, JobError, JobId, JobStatus, Msg, Phase, ProgressSnapshot, TrackerState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that belong to a lifecycle that is no longer current (wrong
/// ticket, wrong job id, or wrong phase) leave the state untouched and
/// produce no effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { kind } => {
            if state.is_active() {
                desk_debug!("start of {} job ignored: a job is already active", kind);
                Vec::new()
            } else {
                // Starting over acknowledges any terminal job left in the slot.
                let ticket = state.begin(kind);
                vec![Effect::Submit { ticket, kind }]
            }
        }
        Msg::SubmitSucceeded { ticket, job_id } => {
            match state.job_in(ticket, Phase::Submitting) {
                Some(job) => {
                    desk_info!("{} job {} accepted as {}", job.kind, ticket, job_id);
                    job.id = Some(job_id.clone());
                    let kind = job.kind;
                    state.phase = Phase::Polling;
                    vec![
                        Effect::Started {
                            ticket,
                            job_id: job_id.clone(),
                            kind,
                        },
                        Effect::SchedulePoll { job_id, kind },
                    ]
                }
                None => {
                    desk_debug!("discarding submission result for superseded ticket {}", ticket);
                    Vec::new()
                }
            }
        }
        Msg::SubmitFailed { ticket, error } => {
            if state.job_in(ticket, Phase::Submitting).is_some() {
                fail(&mut state, error)
            } else {
                desk_debug!("discarding submission failure for superseded ticket {}", ticket);
                Vec::new()
            }
        }
        Msg::StatusReceived { job_id, payload } => apply_status(&mut state, job_id, &payload),
        Msg::PollFailed { job_id, error } => {
            if state.polling_job(&job_id).is_some() {
                fail(&mut state, error)
            } else {
                desk_debug!("discarding poll failure for inactive job {}", job_id);
                Vec::new()
            }
        }
        Msg::CancelRequested { ticket } => {
            let matches = ticket.is_none() || ticket == state.current_ticket();
            if state.is_active() && matches {
                desk_info!("cancelling active job {:?}", state.job_id());
                state.reset();
            }
            Vec::new()
        }
        Msg::Dismissed { ticket } => {
            let matches = ticket.is_none() || ticket == state.current_ticket();
            if state.phase().is_terminal() && matches {
                state.reset();
                vec![Effect::Reset]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn apply_status(state: &mut TrackerState, job_id: JobId, payload: &Value) -> Vec<Effect> {
    let Some(job) = state.polling_job(&job_id) else {
        desk_debug!("discarding stale status response for job {}", job_id);
        return Vec::new();
    };

    let report = match StatusReport::parse(job.kind, payload) {
        Ok(report) => report,
        Err(reason) => {
            let error = JobError::poll_transport(format!("malformed status response: {reason}"), None);
            return fail(state, error);
        }
    };
    desk_debug!(
        "job {} status={:?} progress={:?} message={:?}",
        job_id,
        report.status,
        report.progress,
        report.message
    );

    job.status = report.status;
    if let Some(progress) = report.progress {
        job.progress = job.progress.max(progress);
    }
    job.message = report.message;
    let kind = job.kind;

    let mut effects = vec![Effect::EmitProgress(ProgressSnapshot {
        job_id: job_id.clone(),
        progress: job.progress,
        message: job.message.clone(),
    })];

    if let Some(items) = report.found_items {
        if !items.is_empty() && items != job.found_items {
            job.found_items = items.clone();
            effects.push(Effect::EmitFoundItems {
                job_id: job_id.clone(),
                items,
            });
        }
    }

    match report.status {
        JobStatus::Queued | JobStatus::InProgress => {
            effects.push(Effect::SchedulePoll { job_id, kind });
        }
        JobStatus::Completed => {
            let result = normalize(report.result.as_ref().unwrap_or(&Value::Null));
            desk_info!(
                "job {} completed with {} tables",
                job_id,
                result.summary.table_count
            );
            job.result = Some(result.clone());
            state.phase = Phase::Completed;
            effects.push(Effect::DeliverResult { job_id, result });
        }
        JobStatus::Failed => {
            effects.extend(fail(
                state,
                JobError::JobFailed {
                    server_message: report.error,
                },
            ));
        }
    }
    effects
}

/// Moves the current lifecycle to `Failed`.
fn fail(state: &mut TrackerState, error: JobError) -> Vec<Effect> {
    let Some(job) = state.job.as_mut() else {
        return Vec::new();
    };
    desk_warn!("{} job {} failed: {}", job.kind, job.ticket, error);
    job.status = JobStatus::Failed;
    job.error = Some(error.clone());
    let ticket = job.ticket;
    let job_id = job.id.clone();
    state.phase = Phase::Failed;
    vec![
        Effect::EmitFailure {
            ticket,
            job_id,
            error,
        },
        Effect::ScheduleDismiss { ticket },
    ]
}
