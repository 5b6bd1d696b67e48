use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use datadesk_core::{update, Effect, JobId, JobKind, Msg, Ticket, TrackerState, TrackerView};
use datadesk_logging::{desk_debug, desk_info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{ClientError, JobClient, JobOutcome, JobRequest, TrackerEvent, TrackerSink};

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub research_poll_interval: Duration,
    pub pdf_poll_interval: Duration,
    /// Limit for a single status request.
    pub status_timeout: Duration,
    /// How long a failed job stays visible before the tracker resets.
    pub failure_reset_delay: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            research_poll_interval: Duration::from_millis(2000),
            pdf_poll_interval: Duration::from_millis(1000),
            status_timeout: Duration::from_secs(10),
            failure_reset_delay: Duration::from_millis(3000),
        }
    }
}

impl TrackerSettings {
    pub fn poll_interval(&self, kind: JobKind) -> Duration {
        match kind {
            JobKind::Research => self.research_poll_interval,
            JobKind::PdfProcessing => self.pdf_poll_interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("a job is already active")]
    Busy,
    #[error("job was cancelled before the server accepted it")]
    Cancelled,
    #[error(transparent)]
    Job(#[from] datadesk_core::JobError),
}

/// Owns one job at a time: submits it, polls it to a terminal state and
/// reports through the sink.
#[derive(Clone)]
pub struct JobTracker {
    inner: Arc<Inner>,
}

struct Inner {
    client: Arc<dyn JobClient>,
    sink: Arc<dyn TrackerSink>,
    settings: TrackerSettings,
    state: Mutex<TrackerState>,
    /// Cancellation for the lifecycle that is currently submitting or polling.
    armed: Mutex<Option<(Ticket, CancellationToken)>>,
}

enum Next {
    Poll,
    Done(Option<JobOutcome>),
}

impl JobTracker {
    pub fn new(
        client: Arc<dyn JobClient>,
        sink: Arc<dyn TrackerSink>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                sink,
                settings,
                state: Mutex::new(TrackerState::new()),
                armed: Mutex::new(None),
            }),
        }
    }

    pub fn view(&self) -> TrackerView {
        self.inner.view()
    }

    /// Submits `request` and starts polling it.
    ///
    /// Fails with [`TrackerError::Busy`] while another job is submitting or
    /// polling. A submission failure is reported to the sink and returned.
    pub async fn start(&self, request: JobRequest) -> Result<JobHandle, TrackerError> {
        let kind = request.kind();
        let inner = &self.inner;

        let (ticket, token) = inner.begin(kind).ok_or(TrackerError::Busy)?;
        desk_info!("submitting {} job (ticket {})", kind, ticket);

        let submitted = match request.validate() {
            Ok(()) => tokio::select! {
                _ = token.cancelled() => {
                    inner.dispatch(Msg::CancelRequested { ticket: Some(ticket) });
                    return Err(TrackerError::Cancelled);
                }
                result = inner.client.submit(&request) => result,
            },
            Err(err) => Err(err),
        };

        let msg = match submitted {
            Ok(job_id) => Msg::SubmitSucceeded { ticket, job_id },
            Err(err) => Msg::SubmitFailed {
                ticket,
                error: err.into_submission_error(),
            },
        };
        let effects = inner.dispatch(msg);
        let started = effects.iter().find_map(|effect| match effect {
            Effect::Started { job_id, .. } => Some(job_id.clone()),
            _ => None,
        });

        match (started, inner.run_effects(effects)) {
            (Some(job_id), Next::Poll) => {
                let task = tokio::spawn(poll_loop(
                    Arc::clone(inner),
                    ticket,
                    job_id.clone(),
                    kind,
                    token,
                ));
                Ok(JobHandle {
                    ticket,
                    job_id,
                    kind,
                    inner: Arc::clone(inner),
                    task,
                })
            }
            (_, Next::Done(Some(JobOutcome::Failed(error)))) => {
                inner.disarm(ticket);
                Err(TrackerError::Job(error))
            }
            _ => {
                inner.disarm(ticket);
                inner.dispatch(Msg::CancelRequested {
                    ticket: Some(ticket),
                });
                Err(TrackerError::Cancelled)
            }
        }
    }

    /// Stops tracking the active job. The server is not told.
    pub fn cancel(&self) {
        self.inner.cancel(None);
    }

    /// Acknowledges a completed or failed job and returns to idle.
    pub fn dismiss(&self) {
        let effects = self.inner.dispatch(Msg::Dismissed { ticket: None });
        self.inner.run_effects(effects);
    }
}

/// Handle to one submitted job.
pub struct JobHandle {
    ticket: Ticket,
    job_id: JobId,
    kind: JobKind,
    inner: Arc<Inner>,
    task: JoinHandle<Option<JobOutcome>>,
}

impl JobHandle {
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Tracker state, as long as this job is still the tracker's current one.
    pub fn view(&self) -> Option<TrackerView> {
        let view = self.inner.view();
        (view.ticket == Some(self.ticket)).then_some(view)
    }

    /// Cancels this job; does nothing if it already finished or was
    /// superseded.
    pub fn cancel(&self) {
        self.inner.cancel(Some(self.ticket));
    }

    /// Waits for the poll loop. `None` when the job was cancelled.
    pub async fn wait(self) -> Option<JobOutcome> {
        self.task.await.ok().flatten()
    }
}

impl Inner {
    fn view(&self) -> TrackerView {
        lock(&self.state).view()
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = lock(&self.state);
        let (state, effects) = update(std::mem::take(&mut *guard), msg);
        *guard = state;
        effects
    }

    /// Opens a lifecycle and arms its cancellation token under the same
    /// state lock, so a token is never left behind by a newer lifecycle.
    fn begin(&self, kind: JobKind) -> Option<(Ticket, CancellationToken)> {
        let mut guard = lock(&self.state);
        if guard.is_active() {
            return None;
        }
        let (state, effects) = update(
            std::mem::take(&mut *guard),
            Msg::StartRequested { kind },
        );
        *guard = state;
        let ticket = effects.iter().find_map(|effect| match effect {
            Effect::Submit { ticket, .. } => Some(*ticket),
            _ => None,
        })?;

        let token = CancellationToken::new();
        // Lock order is state, then armed.
        if let Some((_, previous)) = lock(&self.armed).replace((ticket, token.clone())) {
            previous.cancel();
        }
        Some((ticket, token))
    }

    fn disarm(&self, ticket: Ticket) {
        let mut armed = lock(&self.armed);
        if armed.as_ref().is_some_and(|(current, _)| *current == ticket) {
            *armed = None;
        }
    }

    fn cancel(&self, ticket: Option<Ticket>) {
        let mut armed = lock(&self.armed);
        let matches = armed
            .as_ref()
            .is_some_and(|(current, _)| ticket.map_or(true, |ticket| ticket == *current));
        if matches {
            if let Some((_, token)) = armed.take() {
                token.cancel();
            }
        }
        drop(armed);
        self.dispatch(Msg::CancelRequested { ticket });
    }

    /// Executes effects, reporting whether another poll is due.
    fn run_effects(self: &Arc<Self>, effects: Vec<Effect>) -> Next {
        let mut poll = false;
        let mut outcome = None;
        for effect in effects {
            match effect {
                // Submission is driven by `JobTracker::start` itself.
                Effect::Submit { .. } => {}
                Effect::Started { job_id, kind, .. } => {
                    self.sink.emit(TrackerEvent::Started { job_id, kind });
                }
                Effect::SchedulePoll { .. } => poll = true,
                Effect::EmitProgress(snapshot) => {
                    self.sink.emit(TrackerEvent::Progress(snapshot));
                }
                Effect::EmitFoundItems { job_id, items } => {
                    self.sink.emit(TrackerEvent::FoundItems { job_id, items });
                }
                Effect::DeliverResult { job_id, result } => {
                    outcome = Some(JobOutcome::Completed(result.clone()));
                    self.sink.emit(TrackerEvent::Completed { job_id, result });
                }
                Effect::EmitFailure { job_id, error, .. } => {
                    outcome = Some(JobOutcome::Failed(error.clone()));
                    self.sink.emit(TrackerEvent::Failed { job_id, error });
                }
                Effect::ScheduleDismiss { ticket } => self.schedule_dismiss(ticket),
                Effect::Reset => self.sink.emit(TrackerEvent::Reset),
            }
        }
        if poll {
            Next::Poll
        } else {
            Next::Done(outcome)
        }
    }

    fn schedule_dismiss(self: &Arc<Self>, ticket: Ticket) {
        let inner = Arc::clone(self);
        let delay = self.settings.failure_reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let effects = inner.dispatch(Msg::Dismissed {
                ticket: Some(ticket),
            });
            inner.run_effects(effects);
        });
    }
}

/// One request at a time: sleep, fetch, apply, repeat until the state
/// machine stops asking for polls.
async fn poll_loop(
    inner: Arc<Inner>,
    ticket: Ticket,
    job_id: JobId,
    kind: JobKind,
    token: CancellationToken,
) -> Option<JobOutcome> {
    let interval = inner.settings.poll_interval(kind);
    let status_timeout = inner.settings.status_timeout;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                desk_debug!("poll loop for job {} cancelled while waiting", job_id);
                return None;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let response = tokio::select! {
            _ = token.cancelled() => {
                desk_debug!("poll loop for job {} cancelled mid-request", job_id);
                return None;
            }
            response = tokio::time::timeout(status_timeout, inner.client.status(kind, &job_id)) => response,
        };

        let msg = match response {
            Ok(Ok(payload)) => Msg::StatusReceived {
                job_id: job_id.clone(),
                payload,
            },
            Ok(Err(err)) => Msg::PollFailed {
                job_id: job_id.clone(),
                error: err.into_poll_error(),
            },
            Err(_elapsed) => Msg::PollFailed {
                job_id: job_id.clone(),
                error: ClientError::Timeout.into_poll_error(),
            },
        };

        match inner.run_effects(inner.dispatch(msg)) {
            Next::Poll => continue,
            Next::Done(outcome) => {
                inner.disarm(ticket);
                return outcome;
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
