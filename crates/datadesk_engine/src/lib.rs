//! Datadesk engine: HTTP job client and the async tracker that drives the
//! core state machine.
mod client;
mod sink;
mod tracker;
mod types;

pub use client::{ClientSettings, JobClient, ReqwestJobClient};
pub use sink::{ChannelSink, TrackerSink};
pub use tracker::{JobHandle, JobTracker, TrackerError, TrackerSettings};
pub use types::{ClientError, JobOutcome, JobRequest, TrackerEvent};
