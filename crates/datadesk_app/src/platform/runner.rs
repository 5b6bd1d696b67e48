use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use chrono::Utc;
use datadesk_core::results_view;
use datadesk_engine::{
    ChannelSink, JobOutcome, JobRequest, JobTracker, ReqwestJobClient, TrackerError, TrackerEvent,
};
use datadesk_logging::{desk_info, desk_warn};
use tokio::sync::mpsc::UnboundedReceiver;

use super::config::AppConfig;
use super::persistence::{HistoryEntry, HistoryStore};
use super::render;

/// How a job run ended, as far as the process exit code is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Failed,
    Cancelled,
}

pub async fn read_upload(path: &Path) -> anyhow::Result<JobRequest> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(JobRequest::PdfUpload {
        file_name,
        bytes: Bytes::from(bytes),
    })
}

/// Runs one job to a terminal state, printing events as they arrive.
/// Ctrl-C stops tracking; the server keeps the job.
pub async fn run_job(config: &AppConfig, request: JobRequest) -> anyhow::Result<RunOutcome> {
    let client = ReqwestJobClient::new(config.client_settings())
        .context("cannot set up the HTTP client")?;
    let (sink, mut events) = ChannelSink::channel();
    let tracker = JobTracker::new(Arc::new(client), Arc::new(sink), config.tracker_settings());
    let kind = request.kind();

    let handle = match tracker.start(request).await {
        Ok(handle) => handle,
        Err(TrackerError::Job(error)) => {
            drain(&mut events);
            desk_warn!("{} job was not accepted: {}", kind, error);
            return Ok(RunOutcome::Failed);
        }
        Err(err) => return Err(err.into()),
    };
    let job_id = handle.job_id().clone();
    println!("Started {kind} job {job_id}");

    let wait = handle.wait();
    tokio::pin!(wait);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        tokio::select! {
            Some(event) = events.recv() => print_event(&event),
            outcome = &mut wait => break outcome,
            _ = &mut ctrl_c => {
                desk_info!("interrupted; no longer tracking job {}", job_id);
                tracker.cancel();
                break None;
            }
        }
    };
    drain(&mut events);

    let Some(outcome) = outcome else {
        println!("Stopped tracking job {job_id}");
        return Ok(RunOutcome::Cancelled);
    };

    let store = HistoryStore::new(&config.data_dir);
    if let Err(err) = store.append(HistoryEntry::new(job_id, kind, &outcome, Utc::now())) {
        desk_warn!("could not record job history: {}", err);
    }

    Ok(match outcome {
        JobOutcome::Completed(_) => RunOutcome::Completed,
        JobOutcome::Failed(_) => RunOutcome::Failed,
    })
}

fn drain(events: &mut UnboundedReceiver<TrackerEvent>) {
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
}

fn print_event(event: &TrackerEvent) {
    match event {
        TrackerEvent::Started { .. } | TrackerEvent::Reset => {}
        TrackerEvent::Progress(snapshot) => println!("{}", render::progress_line(snapshot)),
        TrackerEvent::FoundItems { items, .. } => {
            for line in render::found_items_lines(items) {
                println!("{line}");
            }
        }
        TrackerEvent::Completed { result, .. } => {
            println!();
            for line in render::results_lines(&results_view(result)) {
                println!("{line}");
            }
        }
        TrackerEvent::Failed { error, .. } => eprintln!("Error: {}", error.user_message()),
    }
}
