use datadesk_core::{update, JobKind, Msg, TrackerState};

#[test]
fn cancel_and_dismiss_without_a_job_are_noops() {
    let state = TrackerState::new();
    let (next, effects) = update(state.clone(), Msg::CancelRequested { ticket: None });
    assert_eq!(state, next);
    assert!(effects.is_empty());

    let (next, effects) = update(next, Msg::Dismissed { ticket: None });
    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn start_while_submitting_changes_nothing() {
    let (state, _) = update(
        TrackerState::new(),
        Msg::StartRequested {
            kind: JobKind::Research,
        },
    );
    let (next, effects) = update(
        state.clone(),
        Msg::StartRequested {
            kind: JobKind::PdfProcessing,
        },
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
