use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use datadesk_core::{JobId, JobKind};
use datadesk_engine::JobOutcome;
use datadesk_logging::{desk_info, desk_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const HISTORY_FILENAME: &str = ".datadesk_history.ron";

/// Oldest entries are dropped past this many.
const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot serialize history: {0}")]
    Serialize(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOutcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub job_id: JobId,
    pub kind: JobKind,
    pub outcome: HistoryOutcome,
    pub table_count: usize,
    /// What the user was shown for a failed job.
    pub message: Option<String>,
    /// RFC 3339, UTC.
    pub finished_at: String,
}

impl HistoryEntry {
    pub fn new(
        job_id: JobId,
        kind: JobKind,
        outcome: &JobOutcome,
        finished: DateTime<Utc>,
    ) -> Self {
        let (outcome, table_count, message) = match outcome {
            JobOutcome::Completed(result) => {
                (HistoryOutcome::Completed, result.summary.table_count, None)
            }
            JobOutcome::Failed(error) => (HistoryOutcome::Failed, 0, Some(error.user_message())),
        };
        Self {
            job_id,
            kind,
            outcome,
            table_count,
            message,
            finished_at: finished.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedHistory {
    jobs: Vec<HistoryEntry>,
}

enum Stored {
    Missing,
    Jobs(Vec<HistoryEntry>),
    Corrupt,
}

/// Finished jobs, kept as RON in the app's data directory.
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILENAME)
    }

    /// Where a corrupt history file is moved before it is replaced.
    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{HISTORY_FILENAME}.bak"))
    }

    /// Oldest first. A missing, unreadable or corrupt file reads as empty.
    pub fn load(&self) -> Vec<HistoryEntry> {
        match self.read() {
            Ok(Stored::Jobs(jobs)) => jobs,
            Ok(Stored::Missing | Stored::Corrupt) => Vec::new(),
            Err(err) => {
                desk_warn!("Failed to read job history from {:?}: {}", self.path(), err);
                Vec::new()
            }
        }
    }

    /// Adds `entry`. A corrupt file is moved to [`Self::backup_path`] first;
    /// an unreadable one is left alone and the append fails.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut jobs = match self.read()? {
            Stored::Jobs(jobs) => jobs,
            Stored::Missing => Vec::new(),
            Stored::Corrupt => {
                let backup = self.backup_path();
                fs::rename(self.path(), &backup)?;
                desk_warn!(
                    "Replacing corrupt job history {:?}; old contents moved to {:?}",
                    self.path(),
                    backup
                );
                Vec::new()
            }
        };
        jobs.push(entry);
        if jobs.len() > HISTORY_LIMIT {
            jobs.drain(..jobs.len() - HISTORY_LIMIT);
        }

        let content = ron::ser::to_string_pretty(
            &PersistedHistory { jobs },
            ron::ser::PrettyConfig::new(),
        )
        .map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.write_atomically(&content)?;
        desk_info!("Recorded finished job in {:?}", self.path());
        Ok(())
    }

    fn read(&self) -> io::Result<Stored> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Stored::Missing),
            Err(err) => return Err(err),
        };

        match ron::from_str::<PersistedHistory>(&content) {
            Ok(history) => Ok(Stored::Jobs(history.jobs)),
            Err(err) => {
                desk_warn!("Failed to parse job history from {:?}: {}", path, err);
                Ok(Stored::Corrupt)
            }
        }
    }

    fn write_atomically(&self, content: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(self.path()).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

/// One line per entry for `datadesk history`.
pub fn describe(entry: &HistoryEntry) -> String {
    let outcome = match entry.outcome {
        HistoryOutcome::Completed => format!("completed, {} table(s)", entry.table_count),
        HistoryOutcome::Failed => format!(
            "failed: {}",
            entry.message.as_deref().unwrap_or("no reason given")
        ),
    };
    format!(
        "{}  {:<14}  {}  {}",
        entry.finished_at,
        entry.kind.to_string(),
        entry.job_id,
        outcome
    )
}
