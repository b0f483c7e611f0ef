//! Append-only progress log.
//!
//! Each phase boundary appends one `<timestamp>,<message>` line to the log
//! file. The file is never rotated or truncated; after a failed run its last
//! line shows how far the job got.

use crate::constants::PROGRESS_TIMESTAMP_FORMAT;
use crate::error::Result;
use crate::models::Phase;
use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Phase-boundary events written to the progress log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    JobStarted,
    PhaseStarted(Phase),
    PhaseEnded(Phase),
    JobEnded,
}

impl ProgressEvent {
    pub fn message(&self) -> &'static str {
        match self {
            ProgressEvent::JobStarted => "ETL Job Started",
            ProgressEvent::PhaseStarted(Phase::Extract) => "Extract phase Started",
            ProgressEvent::PhaseEnded(Phase::Extract) => "Extract phase Ended",
            ProgressEvent::PhaseStarted(Phase::Transform) => "Transform phase Started",
            ProgressEvent::PhaseEnded(Phase::Transform) => "Transform phase Ended",
            ProgressEvent::PhaseStarted(Phase::Load) => "Load phase Started",
            ProgressEvent::PhaseEnded(Phase::Load) => "Load phase Ended",
            ProgressEvent::PhaseStarted(Phase::Query) => "Database queried",
            ProgressEvent::PhaseEnded(Phase::Query) => "Database Querying Ended",
            ProgressEvent::JobEnded => "ETL Job Ended",
        }
    }
}

/// Format one log line (without the trailing newline)
pub fn format_line<Tz: TimeZone>(timestamp: &DateTime<Tz>, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{},{}",
        timestamp.format(PROGRESS_TIMESTAMP_FORMAT),
        message
    )
}

/// Appends progress lines to a fixed file
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    path: PathBuf,
}

impl ProgressLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event stamped with the current local time
    pub fn log(&self, event: ProgressEvent) -> Result<()> {
        self.log_at(event, &Local::now())
    }

    /// Append an event with an explicit timestamp
    pub fn log_at<Tz: TimeZone>(&self, event: ProgressEvent, timestamp: &DateTime<Tz>) -> Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let line = format_line(timestamp, event.message());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        info!("{}", event.message());
        Ok(())
    }
}
