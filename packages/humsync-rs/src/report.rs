use crate::error::SyncError;
use crate::segment::{RepairOutcome, RepairStatus, SegmentOutcome};
use crate::types::SyncWindow;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub kind: String,
    pub message: String,
    /// Data-driven skip rather than a failure
    pub skipped: bool,
}

impl From<&SyncError> for ErrorRecord {
    fn from(e: &SyncError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
            skipped: e.is_skip(),
        }
    }
}

/// Per-unit counts used for the run summary and exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Tally {
    fn record(&mut self, error: Option<&ErrorRecord>) {
        match error {
            None => self.succeeded += 1,
            Some(e) if e.skipped => self.skipped += 1,
            Some(_) => self.failed += 1,
        }
    }
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            succeeded: self.succeeded + other.succeeded,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
        }
    }
}

pub trait Tallied {
    fn tally(&self) -> Tally;
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncedFile {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub rows: Option<usize>,
    pub error: Option<ErrorRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySyncReport {
    pub subject: String,
    pub activity: String,
    pub window: Option<SyncWindow>,
    pub files: Vec<SyncedFile>,
    /// Set when the whole activity was skipped
    pub error: Option<ErrorRecord>,
}

impl Tallied for ActivitySyncReport {
    fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        if self.error.is_some() {
            tally.record(self.error.as_ref());
            return tally;
        }
        for file in &self.files {
            tally.record(file.error.as_ref());
        }
        tally
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentedFile {
    pub source: PathBuf,
    pub outcome: Option<SegmentOutcome>,
    /// Event files that would be written (dry run only)
    pub planned: Option<Vec<PathBuf>>,
    pub error: Option<ErrorRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySegmentReport {
    pub subject: String,
    pub activity: String,
    pub repairs: Vec<RepairOutcome>,
    pub files: Vec<SegmentedFile>,
    pub error: Option<ErrorRecord>,
}

impl Tallied for ActivitySegmentReport {
    fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        if self.error.is_some() {
            tally.record(self.error.as_ref());
            return tally;
        }
        for file in &self.files {
            tally.record(file.error.as_ref());
        }
        for repair in &self.repairs {
            if repair.status == RepairStatus::Failed {
                tally.failed += 1;
            }
        }
        tally
    }
}

/// Top-level result of one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T> {
    pub id: String,
    pub created_at: String,
    pub activities: Vec<T>,
}

impl<T: Tallied> RunReport<T> {
    pub fn new(activities: Vec<T>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            activities,
        }
    }

    pub fn tally(&self) -> Tally {
        self.activities
            .iter()
            .map(Tallied::tally)
            .fold(Tally::default(), |acc, t| acc + t)
    }
}
