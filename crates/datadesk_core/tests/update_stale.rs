use datadesk_core::{update, Effect, JobError, JobId, JobKind, Msg, Phase, TrackerState};
use serde_json::json;

fn start(kind: JobKind) -> TrackerState {
    let (state, _) = update(TrackerState::new(), Msg::StartRequested { kind });
    state
}

#[test]
fn late_response_after_cancel_is_discarded() {
    datadesk_logging::initialize_for_tests();
    let (state, _) = update(
        start(JobKind::PdfProcessing),
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: JobId::new("a"),
        },
    );
    let (state, effects) = update(state, Msg::CancelRequested { ticket: None });
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            job_id: JobId::new("a"),
            payload: json!({"status": "completed", "progress": 100, "tables": []}),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().results, None);
}

#[test]
fn response_for_a_superseded_job_does_not_touch_the_active_one() {
    datadesk_logging::initialize_for_tests();
    let (state, _) = update(
        start(JobKind::PdfProcessing),
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: JobId::new("old"),
        },
    );
    let (state, _) = update(state, Msg::CancelRequested { ticket: None });
    let (state, _) = update(
        state,
        Msg::StartRequested {
            kind: JobKind::PdfProcessing,
        },
    );
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 2,
            job_id: JobId::new("new"),
        },
    );
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            job_id: JobId::new("old"),
            payload: json!({"status": "failed", "error": "boom"}),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(
        state,
        Msg::PollFailed {
            job_id: JobId::new("old"),
            error: JobError::poll_transport("timeout", None),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn submission_result_for_a_cancelled_ticket_is_discarded() {
    datadesk_logging::initialize_for_tests();
    let (state, _) = update(start(JobKind::Research), Msg::CancelRequested { ticket: None });
    let (state, _) = update(
        state,
        Msg::StartRequested {
            kind: JobKind::Research,
        },
    );

    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: JobId::new("late"),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Submitting);
    assert_eq!(state.job_id(), None);

    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            ticket: 2,
            job_id: JobId::new("current"),
        },
    );
    assert!(matches!(effects[0], Effect::Started { ticket: 2, .. }));
    assert_eq!(state.job_id(), Some(&JobId::new("current")));
}

#[test]
fn cancel_for_an_older_ticket_leaves_the_active_job_alone() {
    datadesk_logging::initialize_for_tests();
    let (state, _) = update(
        start(JobKind::PdfProcessing),
        Msg::SubmitSucceeded {
            ticket: 1,
            job_id: JobId::new("a"),
        },
    );
    let (state, _) = update(
        state,
        Msg::StatusReceived {
            job_id: JobId::new("a"),
            payload: json!({"status": "completed", "tables": []}),
        },
    );
    let (state, _) = update(
        state,
        Msg::StartRequested {
            kind: JobKind::Research,
        },
    );

    let (state, effects) = update(state, Msg::CancelRequested { ticket: Some(1) });
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Submitting);

    let (state, _) = update(state, Msg::CancelRequested { ticket: Some(2) });
    assert_eq!(state.phase(), Phase::Idle);
}
