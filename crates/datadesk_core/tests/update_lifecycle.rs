use std::sync::Once;

use datadesk_core::{
    update, Effect, FoundItem, JobError, JobId, JobKind, JobStatus, Msg, Phase, ProgressSnapshot,
    ResultsView, TrackerState, GENERIC_FAILURE_MESSAGE,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(datadesk_logging::initialize_for_tests);
}

fn job_id() -> JobId {
    JobId::new("3f2a")
}

/// Drives a fresh tracker into `Polling` for the given kind.
fn polling(kind: JobKind) -> TrackerState {
    let (state, effects) = update(TrackerState::new(), Msg::StartRequested { kind });
    assert_eq!(effects, vec![Effect::Submit { ticket: 1, kind }]);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: job_id(),
        },
    );
    assert_eq!(state.phase(), Phase::Polling);
    state
}

fn status(state: TrackerState, payload: serde_json::Value) -> (TrackerState, Vec<Effect>) {
    update(
        state,
        Msg::StatusReceived {
            job_id: job_id(),
            payload,
        },
    )
}

#[test]
fn start_moves_idle_to_submitting_and_queues_the_job() {
    init_logging();
    let (state, effects) = update(
        TrackerState::new(),
        Msg::StartRequested {
            kind: JobKind::Research,
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Submit {
            ticket: 1,
            kind: JobKind::Research
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.status, Some(JobStatus::Queued));
    assert_eq!(view.job_id, None);
}

#[test]
fn submission_success_starts_exactly_once_then_polls() {
    init_logging();
    let (state, _) = update(
        TrackerState::new(),
        Msg::StartRequested {
            kind: JobKind::PdfProcessing,
        },
    );
    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: job_id(),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Started {
                ticket: 1,
                job_id: job_id(),
                kind: JobKind::PdfProcessing,
            },
            Effect::SchedulePoll {
                job_id: job_id(),
                kind: JobKind::PdfProcessing,
            },
        ]
    );

    // A duplicated acknowledgement does not start a second time.
    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: job_id(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.job_id(), Some(&job_id()));
}

#[test]
fn start_is_rejected_while_a_job_is_active() {
    init_logging();
    let state = polling(JobKind::Research);
    let before = state.clone();

    let (next, effects) = update(
        state,
        Msg::StartRequested {
            kind: JobKind::PdfProcessing,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(next, before);
}

#[test]
fn in_progress_emits_progress_and_schedules_next_poll() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, effects) = status(
        state,
        json!({"status": "processing", "progress": 36.0, "message": "Processing PDF... 20%"}),
    );

    assert_eq!(
        effects,
        vec![
            Effect::EmitProgress(ProgressSnapshot {
                job_id: job_id(),
                progress: 36,
                message: "Processing PDF... 20%".to_string(),
            }),
            Effect::SchedulePoll {
                job_id: job_id(),
                kind: JobKind::PdfProcessing,
            },
        ]
    );
    assert_eq!(state.view().status, Some(JobStatus::InProgress));
}

#[test]
fn progress_regressions_are_held_at_the_high_water_mark() {
    init_logging();
    let state = polling(JobKind::Research);
    let (state, _) = status(state, json!({"status": "in_progress", "progress": 60}));
    let (state, effects) = status(
        state,
        json!({"status": "in_progress", "progress": 45, "message": "Retrying download"}),
    );

    assert_eq!(
        effects[0],
        Effect::EmitProgress(ProgressSnapshot {
            job_id: job_id(),
            progress: 60,
            message: "Retrying download".to_string(),
        })
    );
    assert_eq!(state.view().progress, 60);
}

#[test]
fn completion_is_driven_by_status_not_progress() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, effects) = status(
        state,
        json!({
            "status": "completed",
            "progress": 40,
            "message": "PDF processing completed!",
            "tables": [],
            "table_count": 0
        }),
    );

    assert_eq!(state.phase(), Phase::Completed);
    assert!(matches!(effects.last(), Some(Effect::DeliverResult { .. })));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::SchedulePoll { .. })));
    assert_eq!(
        state.view().results,
        Some(ResultsView::NoTables {
            placeholder: "No tables found"
        })
    );
}

#[test]
fn found_items_are_delivered_separately_and_only_when_changed() {
    init_logging();
    let state = polling(JobKind::Research);
    let payload = json!({
        "status": "in_progress",
        "progress": 30,
        "message": "Found 1 PDFs, downloading and processing...",
        "found_pdfs": [{"title": "Energy statistics", "url": "https://stats.example/e.pdf"}]
    });

    let (state, effects) = status(state, payload.clone());
    assert_eq!(effects.len(), 3);
    assert_eq!(
        effects[1],
        Effect::EmitFoundItems {
            job_id: job_id(),
            items: vec![FoundItem {
                title: Some("Energy statistics".to_string()),
                url: "https://stats.example/e.pdf".to_string(),
            }],
        }
    );

    let (state, effects) = status(state, payload);
    assert_eq!(effects.len(), 2);
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::EmitFoundItems { .. })));
    assert_eq!(state.view().found_items.len(), 1);
}

#[test]
fn server_failure_carries_error_text_and_schedules_reset() {
    init_logging();
    let state = polling(JobKind::Research);
    let (state, effects) = status(
        state,
        json!({
            "status": "failed",
            "progress": 0,
            "message": "Research failed: No relevant PDFs found",
            "error": "No relevant PDFs found"
        }),
    );

    let error = JobError::JobFailed {
        server_message: Some("No relevant PDFs found".to_string()),
    };
    assert_eq!(
        &effects[1..],
        &[
            Effect::EmitFailure {
                ticket: 1,
                job_id: Some(job_id()),
                error,
            },
            Effect::ScheduleDismiss { ticket: 1 },
        ]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Failed);
    assert_eq!(view.error_message.as_deref(), Some("No relevant PDFs found"));
}

#[test]
fn malformed_status_fails_the_job() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, effects) = status(state, json!({"progress": 10}));

    assert_eq!(state.phase(), Phase::Failed);
    assert!(matches!(
        &effects[0],
        Effect::EmitFailure {
            error: JobError::PollTransport { .. },
            ..
        }
    ));
    assert_eq!(
        state.view().error_message.as_deref(),
        Some(GENERIC_FAILURE_MESSAGE)
    );
}

#[test]
fn transport_failure_during_polling_is_terminal() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, effects) = update(
        state,
        Msg::PollFailed {
            job_id: job_id(),
            error: JobError::poll_transport("connection reset", None),
        },
    );

    assert_eq!(state.phase(), Phase::Failed);
    assert_eq!(effects.len(), 2);
}

#[test]
fn submission_failure_goes_straight_to_failed() {
    init_logging();
    let (state, _) = update(
        TrackerState::new(),
        Msg::StartRequested {
            kind: JobKind::PdfProcessing,
        },
    );
    let error = JobError::submission("http status 400", Some("File must be a PDF".to_string()));
    let (state, effects) = update(
        state,
        Msg::SubmitFailed {
            ticket: 1,
            error: error.clone(),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::EmitFailure {
                ticket: 1,
                job_id: None,
                error,
            },
            Effect::ScheduleDismiss { ticket: 1 },
        ]
    );
    assert_eq!(
        state.view().error_message.as_deref(),
        Some("File must be a PDF")
    );
}

#[test]
fn dismiss_returns_terminal_job_to_idle() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, _) = status(state, json!({"status": "failed"}));

    // A reset scheduled by an older lifecycle does not apply.
    let (state, effects) = update(state, Msg::Dismissed { ticket: Some(7) });
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Failed);

    let (state, effects) = update(state, Msg::Dismissed { ticket: Some(1) });
    assert_eq!(effects, vec![Effect::Reset]);
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().job_id, None);
}

#[test]
fn starting_after_a_terminal_job_acknowledges_it() {
    init_logging();
    let state = polling(JobKind::PdfProcessing);
    let (state, _) = status(state, json!({"status": "completed", "tables": []}));

    let (state, effects) = update(
        state,
        Msg::StartRequested {
            kind: JobKind::Research,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Submit {
            ticket: 2,
            kind: JobKind::Research
        }]
    );
    let view = state.view();
    assert_eq!(view.phase, Phase::Submitting);
    assert_eq!(view.results, None);
}
